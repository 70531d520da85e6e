use std::fmt::Display;

const MAX_MESSAGES: usize = 20;

/// Prefix for failures no handler anticipated.
pub const UNEXPECTED_ERROR: &str = "Unexpected error:";

/// Unexpected failures shown to the user as `"<prefix> <message>"`, newest last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBanner {
    messages: Vec<String>,
}

impl ErrorBanner {
    pub fn report(&mut self, prefix: &str, error: &dyn Display) {
        let message = format!("{prefix} {error}");
        tracing::error!(%message, "reported to the error banner");
        if self.messages.len() == MAX_MESSAGES {
            self.messages.remove(0);
        }
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
