//! Configuration management for genrescope.
//!
//! Values come from environment variables, optionally seeded from a `.env` file
//! in the local data directory. Most settings have a default pointing at the
//! public Spotify endpoints; the client id and secret do not.
//!
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults (where applicable)

use std::{env, path::PathBuf};

use crate::error::DiscoveryError;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str = "user-read-private user-read-email";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_PROXY_ADDRESS: &str = "127.0.0.1:3000";

/// Loads environment variables from `<data_local_dir>/genrescope/.env`.
///
/// Creates the directory if needed. A missing `.env` file is fine, every
/// setting can also come from the process environment; a file that exists but
/// cannot be parsed is reported as an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/genrescope/.env`
/// - macOS: `~/Library/Application Support/genrescope/.env`
/// - Windows: `%LOCALAPPDATA%/genrescope/.env`
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Root directory for everything genrescope keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("genrescope");
    path
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn required(name: &str) -> Result<String, DiscoveryError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DiscoveryError::Config(format!("{} must be set", name)))
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Address the token refresh proxy binds to (`PROXY_ADDRESS`).
pub fn proxy_addr() -> String {
    var_or("PROXY_ADDRESS", DEFAULT_PROXY_ADDRESS)
}

/// Client id registered on the Spotify developer dashboard
/// (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, DiscoveryError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Client secret used by the refresh proxy (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// Only the `serve` command needs it; it never leaves the proxy process.
pub fn spotify_client_secret() -> Result<String, DiscoveryError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Redirect URI registered for the application (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Space separated scopes requested at authorization (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

/// Authorization endpoint (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Web API base URL (`SPOTIFY_API_URL`), without a trailing slash.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Token exchange endpoint (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}
