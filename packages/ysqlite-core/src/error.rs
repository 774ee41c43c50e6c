use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid update: {0}")]
    Decode(String),
    #[error("invalid state vector: {0}")]
    StateVector(String),
    #[error("failed to apply update: {0}")]
    Apply(String),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}
