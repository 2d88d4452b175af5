use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

use crate::{error::DiscoveryError, utils};

pub const UNKNOWN_ARTISTS: &str = "Unknown Artists";

/// Search input as typed by the user or carried on the result route, before
/// validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub genre: String,
    pub start_year: String,
    pub end_year: String,
}

/// A genre plus an inclusive year range. Its [`key`](SearchQuery::key) is what
/// the orchestrator deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub genre: String,
    pub start_year: u16,
    pub end_year: u16,
}

impl SearchQuery {
    /// Validates raw user input. Nothing touches the network before this passes.
    pub fn parse(genre: &str, start_year: &str, end_year: &str) -> Result<Self, DiscoveryError> {
        let genre = genre.trim();
        if genre.is_empty() {
            return Err(DiscoveryError::InvalidInput(
                "Genre must not be empty".to_string(),
            ));
        }

        let start_year = utils::parse_year(start_year)?;
        let end_year = utils::parse_year(end_year)?;
        if start_year > end_year {
            return Err(DiscoveryError::InvalidInput(
                "Start year cannot be greater than end year".to_string(),
            ));
        }

        Ok(Self {
            genre: genre.to_string(),
            start_year,
            end_year,
        })
    }

    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.genre, self.start_year, self.end_year)
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "genre:{} year:{}-{}",
            self.genre, self.start_year, self.end_year
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreSeedsResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPage {
    pub items: Vec<RawTrack>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

/// A track item exactly as the search endpoint returns it.
///
/// `artists` stays untyped: it is normally a list of artist objects but may be
/// missing or garbage, which normalizes to [`UNKNOWN_ARTISTS`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrack {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Value,
    #[serde(default)]
    pub popularity: u32,
    pub album: RawAlbum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAlbum {
    pub name: String,
    pub href: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// A normalized search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub popularity: u32,
    pub album_name: String,
    pub album_href: Option<String>,
    pub album_uri: Option<String>,
    pub image: Option<String>,
    pub external_urls: HashMap<String, String>,
}

impl Track {
    /// Normalizes a raw search item. Fails only when the id cannot be derived
    /// from the track URI.
    pub fn from_raw(raw: RawTrack) -> Result<Self, String> {
        let id = utils::track_id_from_uri(&raw.uri)
            .ok_or_else(|| format!("track uri '{}' does not carry an id", raw.uri))?;

        Ok(Self {
            id,
            artists: utils::normalize_artists(&raw.artists),
            name: raw.name,
            popularity: raw.popularity,
            image: raw.album.images.first().map(|i| i.url.clone()),
            album_name: raw.album.name,
            album_href: raw.album.href,
            album_uri: raw.album.uri,
            external_urls: raw.album.external_urls,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default)]
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
}

impl AudioFeatures {
    pub fn value(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Danceability => self.danceability,
            FeatureKind::Energy => self.energy,
            FeatureKind::Loudness => self.loudness,
            FeatureKind::Speechiness => self.speechiness,
            FeatureKind::Acousticness => self.acousticness,
            FeatureKind::Instrumentalness => self.instrumentalness,
            FeatureKind::Liveness => self.liveness,
            FeatureKind::Valence => self.valence,
            FeatureKind::Tempo => self.tempo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Danceability,
    Energy,
    Loudness,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 9] = [
        FeatureKind::Danceability,
        FeatureKind::Energy,
        FeatureKind::Loudness,
        FeatureKind::Speechiness,
        FeatureKind::Acousticness,
        FeatureKind::Instrumentalness,
        FeatureKind::Liveness,
        FeatureKind::Valence,
        FeatureKind::Tempo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Danceability => "danceability",
            FeatureKind::Energy => "energy",
            FeatureKind::Loudness => "loudness",
            FeatureKind::Speechiness => "speechiness",
            FeatureKind::Acousticness => "acousticness",
            FeatureKind::Instrumentalness => "instrumentalness",
            FeatureKind::Liveness => "liveness",
            FeatureKind::Valence => "valence",
            FeatureKind::Tempo => "tempo",
        }
    }

    /// Axis range used when plotting the distribution. Tempo has no upper
    /// bound in the catalog; 250 BPM covers practically everything.
    pub fn display_range(&self) -> (f64, f64) {
        match self {
            FeatureKind::Loudness => (-60.0, 0.0),
            FeatureKind::Tempo => (0.0, 250.0),
            _ => (0.0, 1.0),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FeatureKind::Danceability => {
                "How suitable a track is for dancing, from tempo, rhythm stability, beat strength and regularity."
            }
            FeatureKind::Energy => "Perceptual measure of intensity and activity.",
            FeatureKind::Loudness => "Overall loudness of a track in decibels (dB).",
            FeatureKind::Speechiness => "Presence of spoken words in a track.",
            FeatureKind::Acousticness => "Confidence that the track is acoustic.",
            FeatureKind::Instrumentalness => "Likelihood that the track contains no vocals.",
            FeatureKind::Liveness => "Probability that the track was performed live.",
            FeatureKind::Valence => "Musical positiveness conveyed by a track.",
            FeatureKind::Tempo => "Estimated tempo in beats per minute (BPM).",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Nine index-aligned feature sequences.
///
/// Tracks whose feature payload came back empty are skipped, so the sequences
/// can be shorter than the track list; `track_ids[i]` names the track that
/// produced index `i` of every sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSeries {
    pub track_ids: Vec<String>,
    pub danceability: Vec<f64>,
    pub energy: Vec<f64>,
    pub loudness: Vec<f64>,
    pub speechiness: Vec<f64>,
    pub acousticness: Vec<f64>,
    pub instrumentalness: Vec<f64>,
    pub liveness: Vec<f64>,
    pub valence: Vec<f64>,
    pub tempo: Vec<f64>,
}

impl FeatureSeries {
    pub fn push(&mut self, track_id: &str, features: &AudioFeatures) {
        self.track_ids.push(track_id.to_string());
        for kind in FeatureKind::ALL {
            let value = features.value(kind);
            self.values_mut(kind).push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    pub fn values(&self, kind: FeatureKind) -> &[f64] {
        match kind {
            FeatureKind::Danceability => &self.danceability,
            FeatureKind::Energy => &self.energy,
            FeatureKind::Loudness => &self.loudness,
            FeatureKind::Speechiness => &self.speechiness,
            FeatureKind::Acousticness => &self.acousticness,
            FeatureKind::Instrumentalness => &self.instrumentalness,
            FeatureKind::Liveness => &self.liveness,
            FeatureKind::Valence => &self.valence,
            FeatureKind::Tempo => &self.tempo,
        }
    }

    fn values_mut(&mut self, kind: FeatureKind) -> &mut Vec<f64> {
        match kind {
            FeatureKind::Danceability => &mut self.danceability,
            FeatureKind::Energy => &mut self.energy,
            FeatureKind::Loudness => &mut self.loudness,
            FeatureKind::Speechiness => &mut self.speechiness,
            FeatureKind::Acousticness => &mut self.acousticness,
            FeatureKind::Instrumentalness => &mut self.instrumentalness,
            FeatureKind::Liveness => &mut self.liveness,
            FeatureKind::Valence => &mut self.valence,
            FeatureKind::Tempo => &mut self.tempo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSummary {
    pub count: usize,
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub bars: Vec<TimeInterval>,
    #[serde(default)]
    pub beats: Vec<TimeInterval>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
    pub loudness: Option<f64>,
    pub tempo: Option<f64>,
    pub key: Option<i32>,
    pub mode: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub artists: Value,
}

/// Track details and audio analysis fetched together for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackAnalysis {
    pub track: TrackDetails,
    pub analysis: AudioAnalysis,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub rank: usize,
    pub name: String,
    pub artists: String,
    pub popularity: u32,
    pub album: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct FeatureTableRow {
    pub feature: String,
    pub tracks: usize,
    pub min: String,
    pub median: String,
    pub mean: String,
    pub max: String,
    pub range: String,
}

#[derive(Tabled)]
pub struct SectionTableRow {
    pub start: String,
    pub duration: String,
    pub loudness: String,
    pub tempo: String,
    pub key: String,
}

/// An implicit-grant authorization in progress: the anti-forgery `state` sent
/// with the redirect and, once the callback fired, the access token or the
/// reason it was rejected.
#[derive(Debug, Clone)]
pub struct ImplicitGrant {
    pub state: String,
    pub outcome: Option<Result<String, String>>,
}

impl ImplicitGrant {
    pub fn new(state: String) -> Self {
        Self {
            state,
            outcome: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}
