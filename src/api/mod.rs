//! # API Module
//!
//! HTTP endpoints served by genrescope itself. There are two small servers:
//!
//! - the **callback server**, started by `genrescope auth`, which receives the
//!   implicit-grant redirect and verifies its anti-forgery state
//! - the **refresh proxy**, started by `genrescope serve`, which exchanges a
//!   refresh token for a new access token with the confidential client secret
//!
//! ## Endpoints
//!
//! - [`callback`] - `GET /callback`, forwards the URL fragment to
//!   [`callback_token`]
//! - [`callback_token`] - `GET /callback/token`, checks `state` and hands the
//!   access token to the waiting CLI
//! - [`refresh_token`] - `POST /refresh_token`, token refresh proxy
//! - [`health`] - `GET /health`, status and version
//!
//! Routers are assembled in [`crate::server`].

mod callback;
mod health;
mod refresh;

pub use callback::callback;
pub use callback::callback_token;
pub use health::health;
pub use refresh::RefreshConfig;
pub use refresh::refresh_token;
