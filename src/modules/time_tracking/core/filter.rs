// Ticket list filters. The three predicates are independent and combine with AND.

use crate::modules::time_tracking::core::ticket::{Ticket, TicketStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketFilters {
    /// Empty means every status passes.
    pub statuses: Vec<String>,
    pub client: String,
    pub search: String,
}

impl TicketFilters {
    pub fn with_statuses(statuses: &[TicketStatus]) -> Self {
        Self {
            statuses: statuses.iter().map(|s| s.as_str().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.matches_status(ticket) && self.matches_client(ticket) && self.matches_search(ticket)
    }

    fn matches_status(&self, ticket: &Ticket) -> bool {
        self.statuses.is_empty()
            || self
                .statuses
                .iter()
                .any(|status| TicketStatus::parse(status) == ticket.status)
    }

    fn matches_client(&self, ticket: &Ticket) -> bool {
        let wanted = self.client.trim().to_lowercase();
        wanted.is_empty() || ticket.client.trim().to_lowercase() == wanted
    }

    fn matches_search(&self, ticket: &Ticket) -> bool {
        let term = self.search.trim().to_lowercase();
        term.is_empty()
            || ticket.key.to_lowercase().contains(&term)
            || ticket.title.to_lowercase().contains(&term)
    }
}

pub fn filter_tickets<'a>(tickets: &'a [Ticket], filters: &TicketFilters) -> Vec<&'a Ticket> {
    tickets.iter().filter(|ticket| filters.matches(ticket)).collect()
}

#[cfg(test)]
mod filter_tests {
    use super::*;
    use crate::tests::fixtures::tickets::TicketBuilder;
    use rstest::{fixture, rstest};

    #[fixture]
    fn tickets() -> Vec<Ticket> {
        vec![
            TicketBuilder::new().id("1").key("1001").title("Login broken").client("Acme").build(),
            TicketBuilder::new()
                .id("2")
                .key("1002")
                .title("Login slow")
                .status(TicketStatus::InProgress)
                .client("Globex")
                .build(),
            TicketBuilder::new()
                .id("3")
                .key("1003")
                .title("Login audit")
                .status(TicketStatus::Closed)
                .client("Acme")
                .build(),
        ]
    }

    fn ids(tickets: Vec<&Ticket>) -> Vec<&str> {
        tickets.into_iter().map(|t| t.id.as_str()).collect()
    }

    #[rstest]
    fn it_should_exclude_closed_tickets_when_filtering_open_and_in_progress(tickets: Vec<Ticket>) {
        let filters = TicketFilters {
            search: "login".into(),
            ..TicketFilters::with_statuses(&[TicketStatus::Open, TicketStatus::InProgress])
        };
        assert_eq!(ids(filter_tickets(&tickets, &filters)), vec!["1", "2"]);
    }

    #[rstest]
    fn it_should_pass_everything_without_filters(tickets: Vec<Ticket>) {
        assert_eq!(filter_tickets(&tickets, &TicketFilters::default()).len(), 3);
    }

    #[rstest]
    #[case(" acme ", vec!["1", "3"])]
    #[case("Acm", vec![])]
    fn it_should_match_clients_exactly_ignoring_case(
        tickets: Vec<Ticket>,
        #[case] client: &str,
        #[case] expected: Vec<&str>,
    ) {
        let filters = TicketFilters {
            client: client.into(),
            ..TicketFilters::default()
        };
        assert_eq!(ids(filter_tickets(&tickets, &filters)), expected);
    }

    #[rstest]
    #[case("100", vec!["1", "2", "3"])]
    #[case("SLOW", vec!["2"])]
    #[case("nothing", vec![])]
    fn it_should_search_keys_and_titles(
        tickets: Vec<Ticket>,
        #[case] search: &str,
        #[case] expected: Vec<&str>,
    ) {
        let filters = TicketFilters {
            search: search.into(),
            ..TicketFilters::default()
        };
        assert_eq!(ids(filter_tickets(&tickets, &filters)), expected);
    }

    #[rstest]
    fn it_should_combine_all_predicates(tickets: Vec<Ticket>) {
        let filters = TicketFilters {
            statuses: vec!["closed".into()],
            client: "acme".into(),
            search: "audit".into(),
        };
        assert_eq!(ids(filter_tickets(&tickets, &filters)), vec!["3"]);
    }
}
