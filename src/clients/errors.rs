use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Failed to decode catalog response: {0}")]
    DecodeFailure(#[from] serde_json::Error),

    #[error("Failed to decode artwork image: {0}")]
    ImageDecodeFailure(#[from] image::ImageError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Coarse classification shown to the user when a load fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Decode,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::DecodeFailure(_) => FailureKind::Decode,
            // artwork and URL errors only ever fail a single row
            Error::NetworkFailure(_)
            | Error::ImageDecodeFailure(_)
            | Error::InvalidUrl(_)
            | Error::ConfigurationError(_) => FailureKind::Network,
        }
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
