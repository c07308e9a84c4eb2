use thiserror::Error;

/// Validation and contract errors exposed by `bourse-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid interval '{value}', expected one of 1m, 5m, 15m, 30m, 1h, 1d, 1wk, 1mo")]
    InvalidInterval { value: String },
    #[error("invalid catalog shape '{value}', expected one of auto, flat, grouped")]
    InvalidCatalogShape { value: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Failure to obtain or decode an exchange catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog transport failed: {message}")]
    Transport { message: String, retryable: bool },

    #[error("catalog endpoint '{url}' answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read catalog file '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CatalogError {
    pub const fn retryable(&self) -> bool {
        match self {
            Self::Transport { retryable, .. } => *retryable,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::File { .. } | Self::Malformed(_) => false,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "catalog_transport",
            Self::Status { .. } => "catalog_status",
            Self::File { .. } => "catalog_file",
            Self::Malformed(_) => "catalog_malformed",
        }
    }
}
