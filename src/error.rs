//! Error types returned by the update engine's components.

use thiserror::Error;

use crate::util::ReadMaxError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to serialize request body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read response body: {0}")]
    ReadBody(#[from] ReadMaxError<reqwest::Error>),

    #[error("Response body larger than {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Response body is not an IP address: {body:?}")]
    InvalidIp { body: String },

    #[error("DNS lookup of {host} failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("DNS lookup of {host} returned no addresses")]
    NoAddresses { host: String },

    #[error("No external IP getter URL configured")]
    NoGetterUrl,
}
