use tabled::Table;

use crate::{
    error, info,
    management::{FileTokenStore, SearchOrchestrator},
    spotify::ApiClient,
    success,
    types::{FeatureKind, FeatureSeries, FeatureTableRow, QueryParams, Track, TrackTableRow},
    utils, warning,
};

use super::spinner;

/// Searches tracks of `genre` released between `start_year` and `end_year`,
/// prints them ranked by popularity and summarizes their audio features.
///
/// `limit` only shortens the printed track table; the feature summary always
/// covers every track found.
pub async fn search(genre: String, start_year: String, end_year: String, limit: Option<usize>) {
    let orchestrator =
        SearchOrchestrator::new(ApiClient::from_env(), FileTokenStore::default_location());
    let params = QueryParams {
        genre,
        start_year,
        end_year,
    };

    let pb = spinner(&format!(
        "Searching {} tracks from {} to {}...",
        params.genre, params.start_year, params.end_year
    ));
    let result = orchestrator.initialize(Some(&params)).await;
    pb.finish_and_clear();

    if let Err(e) = result {
        match orchestrator.error_message() {
            Some(message) => error!("{}", message),
            None => error!("{}", e),
        }
    }

    let Some(results) = orchestrator.results() else {
        error!("Search finished without results.");
    };

    if results.tracks.is_empty() {
        warning!("No tracks found for {}.", results.query);
        return;
    }

    print_tracks(&results.tracks, limit);
    print_features(&results.features, results.tracks.len());
    success!(
        "Found {} tracks for {}",
        results.tracks.len(),
        results.query
    );
}

fn print_tracks(tracks: &[Track], limit: Option<usize>) {
    let shown = limit.unwrap_or(tracks.len()).min(tracks.len());
    let rows: Vec<TrackTableRow> = tracks
        .iter()
        .take(shown)
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            rank: i + 1,
            name: t.name.clone(),
            artists: t.artists.clone(),
            popularity: t.popularity,
            album: t.album_name.clone(),
            id: t.id.clone(),
        })
        .collect();

    println!("{}\n", Table::new(rows));
    if shown < tracks.len() {
        info!("Showing {} of {} tracks.", shown, tracks.len());
    }
}

fn print_features(features: &FeatureSeries, track_count: usize) {
    if features.is_empty() {
        warning!("No audio features available for these tracks.");
        return;
    }

    let rows: Vec<FeatureTableRow> = FeatureKind::ALL
        .iter()
        .filter_map(|kind| {
            let summary = utils::summarize(features.values(*kind))?;
            let (low, high) = kind.display_range();
            Some(FeatureTableRow {
                feature: kind.to_string(),
                tracks: summary.count,
                min: format!("{:.3}", summary.min),
                median: format!("{:.3}", summary.median),
                mean: format!("{:.3}", summary.mean),
                max: format!("{:.3}", summary.max),
                range: format!("{} .. {}", low, high),
            })
        })
        .collect();

    println!("Audio Feature Distributions\n{}\n", Table::new(rows));
    if features.len() < track_count {
        warning!(
            "{} of {} tracks had no audio features and are not part of the distributions.",
            track_count - features.len(),
            track_count
        );
    }
}
