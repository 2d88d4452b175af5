use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tracing::debug;

use crate::{
    error::DiscoveryError,
    management::{Debouncer, TokenProvider},
    spotify::{
        analysis,
        client::{ApiClient, RetryPolicy},
        features, genres, search,
    },
    types::{FeatureSeries, QueryParams, SearchQuery, Track, TrackAnalysis},
    utils,
};

/// Where the search flow currently is.
///
/// `Idle → Seeding → Ready → Searching → Complete`, with `Errored` reachable
/// from every non-terminal state. `Complete` and `Errored` are left only by a
/// new distinct query or by re-authorizing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Idle,
    Seeding,
    Ready,
    Searching,
    Complete,
    Errored(String),
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchState::Idle => f.write_str("idle"),
            SearchState::Seeding => f.write_str("seeding"),
            SearchState::Ready => f.write_str("ready"),
            SearchState::Searching => f.write_str("searching"),
            SearchState::Complete => f.write_str("complete"),
            SearchState::Errored(message) => write!(f, "errored ({})", message),
        }
    }
}

/// What happened to a submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search ran and its results are published.
    Completed,
    /// Same query as the one running or already complete; nothing was fetched.
    Duplicate,
    /// A newer trigger replaced this one before it ran or before it finished.
    Superseded,
}

/// Everything one successful search produced. Replaced wholesale by the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: SearchQuery,
    pub tracks: Vec<Track>,
    pub features: FeatureSeries,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub search_debounce: Duration,
    pub feature_debounce: Duration,
    pub seed_policy: RetryPolicy,
    pub page_policy: RetryPolicy,
    pub feature_policy: RetryPolicy,
    pub analysis_policy: RetryPolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(500),
            feature_debounce: Duration::from_millis(300),
            seed_policy: RetryPolicy::genre_seeds(),
            page_policy: RetryPolicy::pagination(),
            feature_policy: RetryPolicy::audio_features(),
            analysis_policy: RetryPolicy::pagination(),
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    state: SearchState,
    genre_seeds: Vec<String>,
    last_query_key: Option<String>,
    generation: u64,
    results: Option<SearchResults>,
    analysis: Option<TrackAnalysis>,
    analysis_error: Option<String>,
}

/// Ties search input to the paginator and the feature aggregator.
///
/// All mutable state lives in one store owned by the orchestrator; each
/// transition reads it fresh, so debounced triggers never act on stale values.
/// Methods take `&self` so overlapping triggers can be polled together on one
/// task. The lock is never held across an await.
pub struct SearchOrchestrator<P: TokenProvider> {
    client: ApiClient,
    tokens: P,
    settings: OrchestratorSettings,
    search_debounce: Debouncer,
    feature_debounce: Debouncer,
    store: Mutex<Store>,
}

impl<P: TokenProvider> SearchOrchestrator<P> {
    pub fn new(client: ApiClient, tokens: P) -> Self {
        Self::with_settings(client, tokens, OrchestratorSettings::default())
    }

    pub fn with_settings(client: ApiClient, tokens: P, settings: OrchestratorSettings) -> Self {
        Self {
            client,
            tokens,
            search_debounce: Debouncer::new(settings.search_debounce),
            feature_debounce: Debouncer::new(settings.feature_debounce),
            settings,
            store: Mutex::new(Store::default()),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tokens(&self) -> &P {
        &self.tokens
    }

    pub fn state(&self) -> SearchState {
        self.store().state.clone()
    }

    pub fn genre_seeds(&self) -> Vec<String> {
        self.store().genre_seeds.clone()
    }

    pub fn results(&self) -> Option<SearchResults> {
        self.store().results.clone()
    }

    pub fn analysis(&self) -> Option<TrackAnalysis> {
        self.store().analysis.clone()
    }

    pub fn analysis_error(&self) -> Option<String> {
        self.store().analysis_error.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        match &self.store().state {
            SearchState::Errored(message) => Some(message.clone()),
            _ => None,
        }
    }

    fn fail(&self, message: String) {
        self.store().state = SearchState::Errored(message);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.store().generation == generation
    }

    /// Idle → Seeding → Ready, then runs `initial` if the caller already has a
    /// query (e.g. parameters on the result route).
    ///
    /// Without an access token the machine goes straight to `Errored` and
    /// nothing is requested. Genre seed failures are tolerated.
    pub async fn initialize(
        &self,
        initial: Option<&QueryParams>,
    ) -> Result<Option<SearchOutcome>, DiscoveryError> {
        {
            let store = self.store();
            if store.state != SearchState::Idle {
                return Err(DiscoveryError::NotReady(format!(
                    "already initialized ({})",
                    store.state
                )));
            }
        }

        let Some(token) = self.tokens.access_token().await else {
            let err = DiscoveryError::MissingCredential;
            self.fail(err.to_string());
            return Err(err);
        };

        self.store().state = SearchState::Seeding;
        let seeds = genres::fetch_genre_seeds(&self.client, &token, &self.settings.seed_policy).await;
        {
            let mut store = self.store();
            store.genre_seeds = seeds;
            store.state = SearchState::Ready;
        }

        match initial {
            Some(params) => self
                .submit(&params.genre, &params.start_year, &params.end_year)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    /// Same as [`submit`](Self::submit) with route-style parameters.
    pub async fn submit_params(&self, params: &QueryParams) -> Result<SearchOutcome, DiscoveryError> {
        self.submit(&params.genre, &params.start_year, &params.end_year)
            .await
    }

    /// Requests a search for `genre` between `start_year` and `end_year`.
    ///
    /// Invalid input is rejected before anything else and leaves the state
    /// alone. A query identical to the one running or complete is a no-op.
    /// Otherwise the trigger waits out the debounce window and runs only if no
    /// newer trigger arrived meanwhile.
    pub async fn submit(
        &self,
        genre: &str,
        start_year: &str,
        end_year: &str,
    ) -> Result<SearchOutcome, DiscoveryError> {
        let query = SearchQuery::parse(genre, start_year, end_year)?;
        let key = query.key();

        {
            let mut store = self.store();
            match store.state {
                SearchState::Idle | SearchState::Seeding => {
                    return Err(DiscoveryError::NotReady(format!(
                        "search requested while {}",
                        store.state
                    )));
                }
                SearchState::Errored(_) => {}
                _ if store.last_query_key.as_deref() == Some(key.as_str()) => {
                    debug!(query = %query, "duplicate query ignored");
                    return Ok(SearchOutcome::Duplicate);
                }
                _ => {}
            }
            store.last_query_key = Some(key);
        }

        if !self.search_debounce.settle().await {
            debug!(query = %query, "query superseded during debounce");
            return Ok(SearchOutcome::Superseded);
        }

        self.execute(query).await
    }

    async fn execute(&self, query: SearchQuery) -> Result<SearchOutcome, DiscoveryError> {
        let Some(token) = self.tokens.access_token().await else {
            let err = DiscoveryError::MissingCredential;
            self.fail(err.to_string());
            return Err(err);
        };

        let generation = {
            let mut store = self.store();
            store.generation += 1;
            store.state = SearchState::Searching;
            store.results = None;
            store.generation
        };

        match self.run_search(&query, &token, generation).await {
            Ok(Some(results)) => {
                let mut store = self.store();
                if store.generation != generation {
                    return Ok(SearchOutcome::Superseded);
                }
                debug!(
                    query = %query,
                    tracks = results.tracks.len(),
                    features = results.features.len(),
                    "search complete"
                );
                store.results = Some(results);
                store.state = SearchState::Complete;
                Ok(SearchOutcome::Completed)
            }
            Ok(None) => Ok(SearchOutcome::Superseded),
            Err(err) => {
                let mut store = self.store();
                if store.generation == generation {
                    store.state =
                        SearchState::Errored(format!("Failed to fetch search results: {}", err));
                }
                Err(err)
            }
        }
    }

    async fn run_search(
        &self,
        query: &SearchQuery,
        token: &str,
        generation: u64,
    ) -> Result<Option<SearchResults>, DiscoveryError> {
        let mut tracks =
            search::fetch_tracks(&self.client, token, query, &self.settings.page_policy).await?;
        utils::remove_duplicate_tracks(&mut tracks);
        utils::sort_tracks_by_popularity(&mut tracks);

        let track_ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();

        if !self.feature_debounce.settle().await || !self.is_current(generation) {
            return Ok(None);
        }

        let features = features::aggregate_features(
            &self.client,
            token,
            &track_ids,
            &self.settings.feature_policy,
        )
        .await?;

        Ok(Some(SearchResults {
            query: query.clone(),
            tracks,
            features,
        }))
    }

    /// Fetches details and analysis of one track on demand.
    ///
    /// Independent of the search flow: success replaces the stored analysis,
    /// failure records [`analysis_error`](Self::analysis_error). The search
    /// state is untouched either way.
    pub async fn load_analysis(&self, track_id: &str) -> Result<(), DiscoveryError> {
        let result = match self.tokens.access_token().await {
            Some(token) => {
                analysis::fetch_track_analysis(
                    &self.client,
                    &token,
                    track_id,
                    &self.settings.analysis_policy,
                )
                .await
            }
            None => Err(DiscoveryError::MissingCredential),
        };

        let mut store = self.store();
        match result {
            Ok(analysis) => {
                store.analysis = Some(analysis);
                store.analysis_error = None;
                Ok(())
            }
            Err(err) => {
                store.analysis_error = Some(format!("Failed to fetch audio analysis: {}", err));
                Err(err)
            }
        }
    }

    /// Stores a new access token and resets the machine to `Idle`, ready for
    /// [`initialize`](Self::initialize). Searches still in flight will not
    /// publish.
    pub async fn reauthorize(&self, token: &str) -> Result<(), DiscoveryError> {
        self.tokens.store_access_token(token).await?;

        let mut store = self.store();
        let generation = store.generation + 1;
        *store = Store::default();
        store.generation = generation;
        Ok(())
    }
}
