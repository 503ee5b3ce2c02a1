use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A comparison or save was requested before a complete message set
    /// was averaged.
    #[error("no averaged readings available; collect data first")]
    NoAverage,

    #[error("no ICs in database to compare")]
    EmptyCatalog,
}

pub type Result<T> = std::result::Result<T, Error>;
