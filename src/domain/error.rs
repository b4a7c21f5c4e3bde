use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Please enter a valid URL.")]
    InvalidInput,

    #[error("A download is already running")]
    Busy,

    #[error("Failed to start downloader: {0}")]
    Spawn(String),

    #[error("Downloader error: {0}")]
    Process(String),

    #[error("Logging error: {0}")]
    Logging(String),
}
