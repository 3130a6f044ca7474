#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
