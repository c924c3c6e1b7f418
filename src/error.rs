//! Top-level error kinds reported by the entry point.

use crate::config::ConfigError;
use crate::scraper::FetchError;
use crate::summarizer::SummarizeError;
use thiserror::Error;

/// Either the page could not be fetched, or something else went wrong
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl Error {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }

    /// Message shown on stderr, prefixed by kind
    pub fn report(&self) -> String {
        match self {
            Error::Fetch(e) => format!("Error fetching URL: {}", e),
            Error::Generic(e) => format!("Error: {}", e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Generic(err.into())
    }
}

impl From<SummarizeError> for Error {
    fn from(err: SummarizeError) -> Self {
        Error::Generic(err.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Generic(err.into())
    }
}
