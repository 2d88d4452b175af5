//! # Spotify Integration Module
//!
//! Everything genrescope asks of the Spotify Web API goes through this module:
//! genre seeds, the paginated genre/year track search, per-track audio
//! features, audio analysis and track details, plus the implicit-grant
//! authorization helpers and the refresh token exchange used by the proxy.
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator / CLI
//!          ↓
//! Spotify Integration Layer
//!     ├── client    (bearer auth, 429 handling, bounded retry)
//!     ├── genres    (seed listing, degrades to empty)
//!     ├── search    (paginator, track normalization)
//!     ├── features  (concurrent per-track fan-out, fail-fast join)
//!     ├── analysis  (sections/bars/beats, track details)
//!     └── auth      (implicit grant, state verification, refresh exchange)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`crate::error::DiscoveryError`]. Response bodies are
//! decoded into explicit schemas from [`crate::types`]; a payload that does not
//! fit is rejected as `MalformedPayload` instead of leaking missing fields.
//!
//! ### Rate Limiting
//! - 429 responses are retried after the `Retry-After` delay
//! - Waits above 120 seconds are not honored, the call gives up instead
//! - 429 retries and back-off retries draw from one bounded budget per call
//!   path, see [`client::RetryPolicy`]
//!
//! ## API Coverage
//!
//! - `GET /recommendations/available-genre-seeds`
//! - `GET /search?q=genre:<g> year:<a>-<b>&type=track&limit=50`
//! - `GET /audio-features?ids=<id>`
//! - `GET /audio-analysis/<id>`
//! - `GET /tracks/<id>`
//! - `POST /api/token` (refresh token grant, proxy only)

pub mod analysis;
pub mod auth;
pub mod client;
pub mod features;
pub mod genres;
pub mod search;

pub use client::{ApiClient, FetchOutcome, RetryPolicy};
