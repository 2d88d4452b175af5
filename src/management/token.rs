use std::{
    collections::HashMap,
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use tracing::warn;

use crate::{config, error::DiscoveryError};

pub const ACCESS_TOKEN_KEY: &str = "spotify_access_token";
pub const AUTH_STATE_KEY: &str = "spotify_auth_state";

/// Key/value store for the access token and the anti-forgery state.
///
/// The token is written once at login and read by every request; nothing
/// expires it, only [`clear_access_token`](TokenProvider::clear_access_token)
/// removes it.
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: &str) -> Result<(), DiscoveryError>;

    async fn remove(&self, key: &str) -> Result<(), DiscoveryError>;

    async fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
            .await
            .filter(|token| !token.is_empty())
    }

    async fn store_access_token(&self, token: &str) -> Result<(), DiscoveryError> {
        self.set(ACCESS_TOKEN_KEY, token).await
    }

    async fn clear_access_token(&self) -> Result<(), DiscoveryError> {
        self.remove(ACCESS_TOKEN_KEY).await
    }
}

impl<P: TokenProvider> TokenProvider for Arc<P> {
    async fn get(&self, key: &str) -> Option<String> {
        self.as_ref().get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DiscoveryError> {
        self.as_ref().set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), DiscoveryError> {
        self.as_ref().remove(key).await
    }
}

/// In-process store, nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(token: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl TokenProvider for MemoryTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DiscoveryError> {
        self.entries
            .lock()
            .map_err(|e| DiscoveryError::Storage(e.to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DiscoveryError> {
        self.entries
            .lock()
            .map_err(|e| DiscoveryError::Storage(e.to_string()))?
            .remove(key);
        Ok(())
    }
}

/// JSON file store, by default `<data_local_dir>/genrescope/cache/session.json`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        let mut path = config::data_dir();
        path.push("cache/session.json");
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>, DiscoveryError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<(), DiscoveryError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }
}

impl TokenProvider for FileTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        match self.load().await {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read token store");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DiscoveryError> {
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), DiscoveryError> {
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}
