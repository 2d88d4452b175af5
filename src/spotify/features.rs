use futures::future::try_join_all;
use tracing::debug;

use crate::{
    error::DiscoveryError,
    spotify::client::{ApiClient, RetryPolicy},
    types::{AudioFeatures, AudioFeaturesResponse, FeatureSeries},
};

/// Audio features of a single track; `None` when the catalog has none.
pub async fn fetch_audio_features(
    client: &ApiClient,
    token: &str,
    track_id: &str,
    policy: &RetryPolicy,
) -> Result<Option<AudioFeatures>, DiscoveryError> {
    let url = client.endpoint(&format!("audio-features?ids={}", track_id));
    let response: AudioFeaturesResponse = client.get_json(&url, token, policy).await?;

    Ok(response.audio_features.into_iter().next().flatten())
}

/// Fetches features for every id concurrently and folds them into nine
/// parallel sequences, in `track_ids` order.
///
/// All-or-nothing: the first request that fails for good rejects the batch and
/// the other results are dropped. Tracks without features are skipped, see
/// [`FeatureSeries::track_ids`] for realigning.
pub async fn aggregate_features(
    client: &ApiClient,
    token: &str,
    track_ids: &[String],
    policy: &RetryPolicy,
) -> Result<FeatureSeries, DiscoveryError> {
    let requests = track_ids
        .iter()
        .map(|id| fetch_audio_features(client, token, id, policy));
    let results = try_join_all(requests).await?;

    let mut series = FeatureSeries::default();
    for (id, features) in track_ids.iter().zip(results) {
        match features {
            Some(features) => series.push(id, &features),
            None => debug!(track_id = %id, "no audio features returned, skipping"),
        }
    }

    debug!(
        requested = track_ids.len(),
        aggregated = series.len(),
        "audio features aggregated"
    );
    Ok(series)
}
