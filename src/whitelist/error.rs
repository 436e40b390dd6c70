use std::path::PathBuf;

use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum WhitelistError {
    #[error("malformed whitelist at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("whitelist i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize whitelist: {0}")]
    Serialize(serde_json::Error),
}

impl From<WhitelistError> for ApiError {
    fn from(err: WhitelistError) -> Self {
        Self::Internal(err.into())
    }
}
