use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] bourse_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Catalog(#[from] bourse_core::CatalogError),

    #[error("config error in '{path}': {message}")]
    Config { path: String, message: String },

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Command(_) => 2,
            Self::Catalog(_) => 3,
            Self::Config { .. } => 4,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
