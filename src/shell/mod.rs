// Composition root for the ticket time tracker.
//
// Responsibilities:
// - Read config from environment.
// - Open the configured key-value store and load persisted state.
// - Wire the controller into the HTTP router and spawn the persistence writer.

pub mod config;
pub mod http;
pub mod state;
