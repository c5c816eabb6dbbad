#[derive(Debug)]
pub enum SequenceError {
    InvalidConfiguration(String),
    LockUnavailable { name: String },
    LockTimeout { name: String },
    SerializationFailure { name: String, message: String },
    DuplicateInitialization { name: String },
    Exhausted { name: String },
    UnknownDatabase(String),
    UnsupportedBackend(String),
    Sql(sqlx::Error),
}

impl SequenceError {
    /// Errors the caller can recover from by re-running its whole transaction.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LockUnavailable { .. }
                | Self::LockTimeout { .. }
                | Self::SerializationFailure { .. }
                | Self::DuplicateInitialization { .. }
        )
    }
}

impl std::fmt::Display for SequenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::LockUnavailable { name } => {
                write!(f, "lock unavailable: sequence {name:?} is locked by another transaction")
            }
            Self::LockTimeout { name } => {
                write!(f, "lock wait timed out: sequence {name:?} stayed locked by another transaction")
            }
            Self::SerializationFailure { name, message } => {
                write!(f, "serialization failure on sequence {name:?}: {message}")
            }
            Self::DuplicateInitialization { name } => {
                write!(f, "duplicate initialization: sequence {name:?} was created concurrently")
            }
            Self::Exhausted { name } => write!(f, "sequence {name:?} is exhausted"),
            Self::UnknownDatabase(alias) => write!(f, "unknown database: {alias:?}"),
            Self::UnsupportedBackend(backend) => write!(f, "unsupported backend: {backend}"),
            Self::Sql(e) => write!(f, "sql: {e}"),
        }
    }
}

impl std::error::Error for SequenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sql(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for SequenceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Sql(e)
    }
}

pub type Result<T> = std::result::Result<T, SequenceError>;
