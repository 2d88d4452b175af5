//! Error type shared by the catalog client, the orchestrator and the servers.

use thiserror::Error;

/// Everything that can go wrong while talking to the catalog API or driving a
/// search.
///
/// Rate limiting is normally absorbed by the retry loop in
/// [`crate::spotify::client::ApiClient::get_json`]; `RateLimited` only surfaces
/// once the attempt budget of a call path is used up or the server asks for an
/// unreasonable wait.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Access token not found. Please authorize the application.")]
    MissingCredential,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limited by the catalog API after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Catalog API responded with status {status} for {url}")]
    RemoteError { status: u16, url: String },

    #[error("Malformed response from {url}: {reason}")]
    MalformedPayload { url: String, reason: String },

    #[error("Search is not available yet: {0}")]
    NotReady(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token store error: {0}")]
    Storage(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),
}

impl DiscoveryError {
    /// Network failures and 5xx responses may succeed when tried again.
    pub fn is_transient(&self) -> bool {
        match self {
            DiscoveryError::NetworkFailure(_) => true,
            DiscoveryError::RemoteError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::Storage(err.to_string())
    }
}
