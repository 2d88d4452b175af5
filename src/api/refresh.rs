use axum::{Json, extract::State, http::StatusCode};
use reqwest::Client;
use serde_json::{Value, json};

use crate::{
    config, error::DiscoveryError, spotify::auth::exchange_refresh_token,
    types::RefreshTokenRequest, warning,
};

/// Credentials the refresh proxy holds on behalf of the client.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub http: Client,
}

impl RefreshConfig {
    pub fn from_env() -> Result<Self, DiscoveryError> {
        Ok(Self {
            token_url: config::spotify_apitoken_url(),
            client_id: config::spotify_client_id()?,
            client_secret: config::spotify_client_secret()?,
            http: Client::new(),
        })
    }
}

/// `POST /refresh_token`: forwards the refresh grant to the identity provider
/// and returns its JSON verbatim, or `500 {"error": ...}`.
pub async fn refresh_token(
    State(config): State<RefreshConfig>,
    Json(body): Json<RefreshTokenRequest>,
) -> (StatusCode, Json<Value>) {
    match exchange_refresh_token(
        &config.http,
        &config.token_url,
        &config.client_id,
        &config.client_secret,
        &body.refresh_token,
    )
    .await
    {
        Ok(token) => (StatusCode::OK, Json(token)),
        Err(e) => {
            warning!("Token refresh failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
