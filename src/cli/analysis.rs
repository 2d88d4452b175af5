use tabled::Table;

use crate::{
    error,
    management::{FileTokenStore, SearchOrchestrator},
    spotify::ApiClient,
    success,
    types::{SectionTableRow, TrackAnalysis},
    utils,
};

use super::spinner;

/// Fetches and prints the structural analysis of one track.
pub async fn analysis(track_id: String) {
    let orchestrator =
        SearchOrchestrator::new(ApiClient::from_env(), FileTokenStore::default_location());

    let pb = spinner("Fetching audio analysis...");
    let result = orchestrator.load_analysis(&track_id).await;
    pb.finish_and_clear();

    if let Err(e) = result {
        match orchestrator.analysis_error() {
            Some(message) => error!("{}", message),
            None => error!("{}", e),
        }
    }

    let Some(TrackAnalysis { track, analysis }) = orchestrator.analysis() else {
        error!("No analysis available for {}.", track_id);
    };

    let rows: Vec<SectionTableRow> = analysis
        .sections
        .iter()
        .map(|s| SectionTableRow {
            start: format!("{:.2}s", s.start),
            duration: format!("{:.2}s", s.duration),
            loudness: s.loudness.map(|l| format!("{:.1} dB", l)).unwrap_or_default(),
            tempo: s.tempo.map(|t| format!("{:.1}", t)).unwrap_or_default(),
            key: s.key.map(|k| k.to_string()).unwrap_or_default(),
        })
        .collect();

    println!("Audio Analysis for {}\n", track.name);
    println!("{}\n", Table::new(rows));

    let beat_durations: Vec<f64> = analysis.beats.iter().map(|b| b.duration).collect();
    let beat_rate = utils::summarize(&beat_durations)
        .filter(|s| s.mean > 0.0)
        .map(|s| format!(", ~{:.1} BPM from beat spacing", 60.0 / s.mean))
        .unwrap_or_default();

    success!(
        "{} sections, {} bars, {} beats{}",
        analysis.sections.len(),
        analysis.bars.len(),
        analysis.beats.len(),
        beat_rate
    );
}
