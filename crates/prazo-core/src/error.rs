use thiserror::Error;

/// Rejected task input. Nothing is created when one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task text is empty")]
    EmptyText,

    #[error("invalid deadline date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid timer value `{0}`, expected a positive integer")]
    InvalidAmount(String),

    #[error("invalid time unit `{0}`, expected minutes, hours or days")]
    InvalidUnit(String),

    #[error("deadline {amount} {unit} from now is out of range")]
    DeadlineOutOfRange { amount: u32, unit: &'static str },
}

/// Failures of the key-value backend or of the persisted payload.
///
/// These never reach the user: loading falls back to an empty registry and
/// saving is best-effort.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read `{key}`: {message}")]
    Read { key: String, message: String },

    #[error("failed to write `{key}`: {message}")]
    Write { key: String, message: String },

    #[error("failed to parse `{key}`")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
