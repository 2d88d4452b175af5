use std::{cmp::Ordering, collections::HashSet};

use rand::{Rng, distr::Alphanumeric};
use serde_json::Value;

use crate::{
    error::DiscoveryError,
    types::{FeatureSummary, Track, UNKNOWN_ARTISTS},
};

/// Random anti-forgery value sent as `state` with the authorization request.
pub fn generate_state_string() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Extracts `<id>` from `spotify:track:<id>`.
pub fn track_id_from_uri(uri: &str) -> Option<String> {
    uri.split(':')
        .nth(2)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Joins artist names with `", "`.
///
/// Anything that is not a list of objects with a string `name` falls back to
/// [`UNKNOWN_ARTISTS`].
pub fn normalize_artists(artists: &Value) -> String {
    let Some(list) = artists.as_array() else {
        return UNKNOWN_ARTISTS.to_string();
    };

    let names: Option<Vec<&str>> = list
        .iter()
        .map(|artist| artist.get("name").and_then(Value::as_str))
        .collect();

    match names {
        Some(names) => names.join(", "),
        None => UNKNOWN_ARTISTS.to_string(),
    }
}

/// Parses a year typed by the user: one to four ASCII digits.
pub fn parse_year(raw: &str) -> Result<u16, DiscoveryError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(DiscoveryError::InvalidInput(format!(
            "'{}' is not a valid year",
            raw
        )));
    }

    raw.parse::<u16>()
        .map_err(|e| DiscoveryError::InvalidInput(format!("'{}' is not a valid year: {}", raw, e)))
}

pub fn remove_duplicate_tracks(tracks: &mut Vec<Track>) {
    let mut seen_ids = HashSet::new();
    tracks.retain(|track| seen_ids.insert(track.id.clone()));
}

/// Most popular first. Stable, so equally popular tracks keep search order.
pub fn sort_tracks_by_popularity(tracks: &mut [Track]) {
    tracks.sort_by(|a, b| b.popularity.cmp(&a.popularity));
}

/// Count, min, median, mean and max of a feature sequence, `None` when empty.
pub fn summarize(values: &[f64]) -> Option<FeatureSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = sorted.len();
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    Some(FeatureSummary {
        count,
        min: sorted[0],
        median,
        mean: sorted.iter().sum::<f64>() / count as f64,
        max: sorted[count - 1],
    })
}
