use crate::{
    error::DiscoveryError,
    spotify::client::{ApiClient, RetryPolicy},
    types::{AudioAnalysis, TrackAnalysis, TrackDetails},
};

fn validate_track_id(track_id: &str) -> Result<(), DiscoveryError> {
    if track_id.is_empty() || !track_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DiscoveryError::InvalidInput(format!(
            "'{}' is not a valid track id",
            track_id
        )));
    }
    Ok(())
}

/// Sections, bars and beats of one track.
pub async fn fetch_audio_analysis(
    client: &ApiClient,
    token: &str,
    track_id: &str,
    policy: &RetryPolicy,
) -> Result<AudioAnalysis, DiscoveryError> {
    validate_track_id(track_id)?;
    let url = client.endpoint(&format!("audio-analysis/{}", track_id));
    client.get_json(&url, token, policy).await
}

pub async fn fetch_track_details(
    client: &ApiClient,
    token: &str,
    track_id: &str,
    policy: &RetryPolicy,
) -> Result<TrackDetails, DiscoveryError> {
    validate_track_id(track_id)?;
    let url = client.endpoint(&format!("tracks/{}", track_id));
    client.get_json(&url, token, policy).await
}

/// Track details and analysis, requested concurrently. Either failure fails
/// the pair.
pub async fn fetch_track_analysis(
    client: &ApiClient,
    token: &str,
    track_id: &str,
    policy: &RetryPolicy,
) -> Result<TrackAnalysis, DiscoveryError> {
    let (track, analysis) = tokio::try_join!(
        fetch_track_details(client, token, track_id, policy),
        fetch_audio_analysis(client, token, track_id, policy),
    )?;

    Ok(TrackAnalysis { track, analysis })
}
