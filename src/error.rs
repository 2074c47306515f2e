use std::io;
use std::result::Result as StdResult;
use teloxide::RequestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Upstream API error: {0}")]
    Upstream(String),
    #[error("Chart render error: {0}")]
    Render(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram error: {0}")]
    Telegram(#[from] RequestError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Upstream(format!("invalid upstream payload: {}", err))
    }
}

pub type Result<T> = StdResult<T, Error>;
