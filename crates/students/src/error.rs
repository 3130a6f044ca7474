use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The data or notes directory could not be read at all.
    #[error("data source unavailable: {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A student name that cannot be used as a note file name.
    #[error("invalid student name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn unavailable(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Unavailable {
            path: path.display().to_string(),
            source,
        }
    }
}

impl tutorbot_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

tutorbot_common::impl_context!();
