use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::{Client, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config,
    error::DiscoveryError,
    management::{AUTH_STATE_KEY, TokenProvider},
    server::start_api_server,
    types::ImplicitGrant,
    utils, warning,
};

/// Builds the implicit-grant authorization URL (`response_type=token`).
pub fn build_authorize_url(
    auth_url: &str,
    client_id: &str,
    scope: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<String, DiscoveryError> {
    let url = Url::parse_with_params(
        auth_url,
        &[
            ("response_type", "token"),
            ("client_id", client_id),
            ("scope", scope),
            ("redirect_uri", redirect_uri),
            ("state", state),
        ],
    )
    .map_err(|e| DiscoveryError::Config(format!("invalid authorization url {}: {}", auth_url, e)))?;

    Ok(url.into())
}

/// Authorization URL for the configured client, scope and redirect URI.
pub fn authorize_url(state: &str) -> Result<String, DiscoveryError> {
    build_authorize_url(
        &config::spotify_apiauth_url(),
        &config::spotify_client_id()?,
        &config::spotify_scope(),
        &config::spotify_redirect_uri(),
        state,
    )
}

/// Checks the parameters the provider appended to the redirect and returns the
/// access token.
///
/// The anti-forgery `state` must come back unchanged; a provider `error`, a
/// missing or different state, or a missing token all reject the callback.
pub fn verify_callback(
    expected_state: &str,
    params: &HashMap<String, String>,
) -> Result<String, DiscoveryError> {
    if let Some(err) = params.get("error") {
        return Err(DiscoveryError::Authorization(format!(
            "provider returned '{}'",
            err
        )));
    }

    match params.get("state") {
        Some(state) if state == expected_state => {}
        Some(_) => {
            return Err(DiscoveryError::Authorization(
                "state does not match the pending authorization".to_string(),
            ));
        }
        None => {
            return Err(DiscoveryError::Authorization(
                "callback carried no state".to_string(),
            ));
        }
    }

    params
        .get("access_token")
        .filter(|token| !token.is_empty())
        .cloned()
        .ok_or_else(|| DiscoveryError::Authorization("callback carried no access token".to_string()))
}

/// Runs the implicit-grant flow end to end.
///
/// Persists a fresh anti-forgery state, starts the local callback server,
/// sends the user to the provider and waits up to 60 seconds for the
/// callback. On success the access token replaces the stored one.
pub async fn auth<P: TokenProvider>(
    store: &P,
    shared_state: Arc<Mutex<Option<ImplicitGrant>>>,
) -> Result<(), DiscoveryError> {
    let state = utils::generate_state_string();
    let auth_url = authorize_url(&state)?;

    store.set(AUTH_STATE_KEY, &state).await?;
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(ImplicitGrant::new(state.clone()));
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = match wait_for_token(shared_state, Duration::from_secs(60)).await {
        Some(Ok(token)) => token,
        Some(Err(reason)) => return Err(DiscoveryError::Authorization(reason)),
        None => {
            return Err(DiscoveryError::Authorization(
                "timed out waiting for the callback".to_string(),
            ));
        }
    };

    if store.get(AUTH_STATE_KEY).await.as_deref() != Some(state.as_str()) {
        return Err(DiscoveryError::Authorization(
            "stored state changed while waiting for the callback".to_string(),
        ));
    }

    store.store_access_token(&token).await?;
    store.remove(AUTH_STATE_KEY).await
}

/// Polls the shared grant until the callback recorded an outcome.
pub async fn wait_for_token(
    shared_state: Arc<Mutex<Option<ImplicitGrant>>>,
    max_wait: Duration,
) -> Option<Result<String, String>> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(outcome) = lock.as_ref().and_then(|grant| grant.outcome.clone()) {
            return Some(outcome);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token using the confidential
/// client credentials. Returns the provider's JSON untouched.
pub async fn exchange_refresh_token(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<Value, DiscoveryError> {
    let response = http
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::RemoteError {
            status: status.as_u16(),
            url: token_url.to_string(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| DiscoveryError::MalformedPayload {
        url: token_url.to_string(),
        reason: e.to_string(),
    })
}
