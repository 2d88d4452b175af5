//! # CLI Module
//!
//! User-facing commands of genrescope. This is the presentation layer: it
//! builds an orchestrator over the stored token, drives it and renders the
//! derived state as terminal tables.
//!
//! ## Commands
//!
//! - [`auth`] - Implicit-grant authorization, stores the access token
//! - [`logout`] - Clears the stored access token
//! - [`genres`] - Lists the genre seeds usable as search filters
//! - [`search`] - Genre/year search ranked by popularity, with a summary of
//!   the nine audio feature distributions
//! - [`analysis`] - Sections, bars and beats of one track
//! - [`serve`] - Token refresh proxy
//!
//! ## Error Handling
//!
//! Commands report failures with the `error!` macro, which prints the message
//! and exits with status 1. Degraded results (no genre seeds, tracks without
//! audio features) are reported with `warning!` and the command goes on.
//!
//! ## Usage
//!
//! ```bash
//! genrescope auth
//! genrescope genres
//! genrescope search --genre jazz --start-year 1959 --end-year 1965 --limit 20
//! genrescope analysis 4uLU6hMCjMI75M1A2tKUQC
//! ```

mod analysis;
mod auth;
mod genres;
mod search;
mod serve;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use analysis::analysis;
pub use auth::auth;
pub use auth::logout;
pub use genres::genres;
pub use search::search;
pub use serve::serve;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
