#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("binding store: {0}")]
    Store(#[from] tutorbot_sessions::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
