use tracing::{debug, warn};

use crate::{
    spotify::client::{ApiClient, RetryPolicy},
    types::GenreSeedsResponse,
};

/// Lists the genre labels usable as search filters.
///
/// Never fails: a non-2xx status, a transport error or an exhausted 429 budget
/// all degrade to an empty list, which the search form tolerates.
pub async fn fetch_genre_seeds(client: &ApiClient, token: &str, policy: &RetryPolicy) -> Vec<String> {
    let url = client.endpoint("recommendations/available-genre-seeds");

    match client
        .get_json::<GenreSeedsResponse>(&url, token, policy)
        .await
    {
        Ok(response) => {
            debug!(count = response.genres.len(), "genre seeds fetched");
            response.genres
        }
        Err(err) => {
            warn!(error = %err, "could not fetch genre seeds, continuing without them");
            Vec::new()
        }
    }
}
