use crate::modules::time_tracking::adapters::inbound::csv_import::CsvImportError;
use crate::shared::infrastructure::key_value_store::KeyValueStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Storage(#[from] KeyValueStoreError),

    #[error(transparent)]
    Import(#[from] CsvImportError),

    #[error("could not encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl ApplicationError {
    pub fn ticket_not_found(id: impl Into<String>) -> Self {
        ApplicationError::NotFound {
            kind: "ticket",
            id: id.into(),
        }
    }
}
