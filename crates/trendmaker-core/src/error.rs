//! Error types for the TrendMaker core library

use thiserror::Error;

/// Failure of a single exchange with the ask endpoint.
///
/// The variants exist for logging. Every one of them is shown to the user as
/// the same chat bubble (see [`crate::chat::BACKEND_ERROR_TEXT`]).
#[derive(Error, Debug)]
pub enum AskError {
    /// Connection refused, DNS failure, reset, ...
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status
    #[error("backend returned status {status}")]
    Status { status: u16 },

    /// The body was not the expected `{"response": string}` JSON
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl AskError {
    /// Short label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            AskError::Network { .. } => "network",
            AskError::Status { .. } => "status",
            AskError::Decode(_) => "decode",
        }
    }
}

/// Errors raised while loading or saving the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
