use reqwest::Url;
use tracing::debug;

use crate::{
    error::DiscoveryError,
    spotify::client::{ApiClient, RetryPolicy},
    types::{SearchQuery, SearchResponse, Track},
};

pub const PAGE_SIZE: u32 = 50;

/// First page of a genre/year track search.
pub fn search_url(client: &ApiClient, query: &SearchQuery) -> Result<String, DiscoveryError> {
    let url = Url::parse_with_params(
        &client.endpoint("search"),
        &[
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("offset", "0".to_string()),
        ],
    )
    .map_err(|e| DiscoveryError::Config(format!("invalid API url {}: {}", client.base_url(), e)))?;

    Ok(url.into())
}

/// Retrieves every track matching `query`, page by page.
///
/// Pages are requested strictly one after another, following the server's
/// `next` link verbatim until it is absent. Any failure aborts the whole
/// search and drops the tracks gathered so far. The result keeps API order;
/// sorting is up to the caller.
pub async fn fetch_tracks(
    client: &ApiClient,
    token: &str,
    query: &SearchQuery,
    policy: &RetryPolicy,
) -> Result<Vec<Track>, DiscoveryError> {
    let mut next = Some(search_url(client, query)?);
    let mut tracks: Vec<Track> = Vec::new();
    let mut pages = 0;

    while let Some(url) = next.take() {
        let page: SearchResponse = client.get_json(&url, token, policy).await?;
        pages += 1;

        for raw in page.tracks.items {
            let track = Track::from_raw(raw).map_err(|reason| DiscoveryError::MalformedPayload {
                url: url.clone(),
                reason,
            })?;
            tracks.push(track);
        }

        debug!(
            page = pages,
            fetched = tracks.len(),
            total = page.tracks.total,
            "search page fetched"
        );
        next = page.tracks.next;
    }

    Ok(tracks)
}
