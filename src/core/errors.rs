use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnkifillError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Missing required configuration: {0}. Check the .env file in the project root.")]
    MissingConfig(String),

    #[error("AnkifillError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for AnkifillError {
    fn from(error: std::io::Error) -> Self {
        AnkifillError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for AnkifillError {
    fn from(error: reqwest::Error) -> Self {
        AnkifillError::Reqwest(Box::new(error))
    }
}
