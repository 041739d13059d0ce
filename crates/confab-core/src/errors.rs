use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfabError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("capture error: {0}")]
    Capture(String),
}
