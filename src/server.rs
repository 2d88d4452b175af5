use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::sync::Mutex;

use crate::{api, config, error::DiscoveryError, types::ImplicitGrant};

pub fn callback_router(state: Arc<Mutex<Option<ImplicitGrant>>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .route("/callback/token", get(api::callback_token))
        .layer(Extension(state))
}

pub fn proxy_router(config: api::RefreshConfig) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/refresh_token", post(api::refresh_token))
        .with_state(config)
}

async fn serve(addr: &str, app: Router) -> Result<(), DiscoveryError> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| DiscoveryError::Config(format!("invalid listen address {}: {}", addr, e)))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DiscoveryError::Server(format!("cannot bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| DiscoveryError::Server(e.to_string()))
}

/// Callback server for the authorization redirect, on `SERVER_ADDRESS`.
pub async fn start_api_server(state: Arc<Mutex<Option<ImplicitGrant>>>) -> Result<(), DiscoveryError> {
    serve(&config::server_addr(), callback_router(state)).await
}

/// Token refresh proxy, on `PROXY_ADDRESS`.
pub async fn start_proxy_server(config: api::RefreshConfig) -> Result<(), DiscoveryError> {
    serve(&config::proxy_addr(), proxy_router(config)).await
}
