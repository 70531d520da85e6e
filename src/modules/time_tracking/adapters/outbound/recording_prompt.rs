// UserPrompt implementation with a preset answer.
//
// Purpose
// - The HTTP shell receives the user's confirmation with the request and returns
//   alerts in the response, so the prompt answers from a flag and records notices.

use crate::modules::time_tracking::core::ports::UserPrompt;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct RecordingPrompt {
    answer: bool,
    alerts: Mutex<Vec<String>>,
    confirmations: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl UserPrompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        if let Ok(mut asked) = self.confirmations.lock() {
            asked.push(message.to_string());
        }
        self.answer
    }

    fn alert(&self, message: &str) {
        tracing::info!(message, "user alert");
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod recording_prompt_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn it_should_answer_with_the_preset(#[case] answer: bool) {
        let prompt = RecordingPrompt::answering(answer);
        assert_eq!(prompt.confirm("Delete?"), answer);
        assert_eq!(prompt.confirmations(), vec!["Delete?"]);
    }

    #[rstest]
    fn it_should_record_alerts() {
        let prompt = RecordingPrompt::default();
        prompt.alert("Select a ticket first");
        assert_eq!(prompt.alerts(), vec!["Select a ticket first"]);
    }
}
