/// Why an inbound event was turned away. Never escapes `Dispatcher::handle` as an error;
/// it is reported to the diagnostic sink and returned inside `Outcome::Rejected`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("no event delivered")]
    NoEvent,
    #[error("action mismatch: expected {expected:?}, got {actual:?}")]
    ActionMismatch { expected: String, actual: Option<String> },
}

/// Work meant for a background thread ran on the primary thread.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{what} must not be called on the primary thread")]
pub struct ThreadingViolation {
    pub what: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Unknown executor kind: {0}")]
    UnknownExecutor(String),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
