use reqwest::StatusCode;
use thiserror::Error;

use crate::models::TimeParseError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API request failed with status: {0}")]
    Status(StatusCode),
    #[error("invalid API response format: {0}")]
    InvalidPayload(&'static str),
    #[error(transparent)]
    Time(#[from] TimeParseError),
}

#[derive(Debug, Error)]
pub enum QuranError {
    #[error("surah number must be between 1 and 114, got {0}")]
    InvalidSurah(u32),
    #[error("failed to fetch {what}: {source}")]
    Http {
        what: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch {what}: HTTP {status}")]
    Status { what: String, status: StatusCode },
}
