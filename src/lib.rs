//! genrescope library
//!
//! A music discovery client for the Spotify catalog: pick a genre and a year
//! range, get every matching track ranked by popularity together with the
//! distribution of their audio features, and drill into the structural
//! analysis of single tracks.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the OAuth callback and the token refresh proxy
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - The crate error type
//! - `management` - Token storage, debouncing and the search orchestrator
//! - `server` - Routers and listeners for the local HTTP servers
//! - `spotify` - Spotify Web API client: fetch/retry, paginator, aggregator
//! - `types` - Wire schemas and domain records
//! - `utils` - Normalization, sorting and summary helpers
//!
//! # Example
//!
//! ```
//! use genrescope::{
//!     management::{FileTokenStore, SearchOrchestrator},
//!     spotify::ApiClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     genrescope::config::load_env().await?;
//!     let orchestrator =
//!         SearchOrchestrator::new(ApiClient::from_env(), FileTokenStore::default_location());
//!     orchestrator.initialize(None).await?;
//!     orchestrator.submit("jazz", "1959", "1965").await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::DiscoveryError;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
///
/// ```
/// info!("Searching tracks for {}", query);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// ```
/// success!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits with status 1.
///
/// Only for the command-line edge, where nothing is left to recover. Library
/// code returns [`DiscoveryError`] instead.
///
/// ```
/// error!("Cannot load environment. Err: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// ```
/// warning!("Token refresh failed: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
