use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostboxError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid sort key: {0}")]
    InvalidSortKey(String),

    #[error("Invalid map mode: {0}")]
    InvalidMapMode(String),

    #[error("Invalid card type: {0}")]
    InvalidCardType(String),

    #[error("Invalid geo config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PostboxError>;
