use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    error, info,
    management::{FileTokenStore, TokenProvider},
    spotify, success,
    types::ImplicitGrant,
};

/// Runs the implicit-grant flow and stores the resulting access token.
pub async fn auth(shared_state: Arc<Mutex<Option<ImplicitGrant>>>) {
    let store = FileTokenStore::default_location();
    info!("Waiting for authorization in the browser...");

    match spotify::auth::auth(&store, shared_state).await {
        Ok(()) => success!("Authentication successful!"),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

/// Removes the stored access token.
pub async fn logout() {
    let store = FileTokenStore::default_location();
    match store.clear_access_token().await {
        Ok(()) => success!("Access token cleared."),
        Err(e) => error!("Cannot clear access token: {}", e),
    }
}
