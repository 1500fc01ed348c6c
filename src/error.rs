use thiserror::Error;

/// Failures of the persistence medium.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("stored value for '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not serialize '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("{0}")]
    Validation(String),
    #[error("no transaction or fixed entry with id {0}")]
    NotFound(u64),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FinanceError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub(crate) type Result<T> = std::result::Result<T, FinanceError>;
