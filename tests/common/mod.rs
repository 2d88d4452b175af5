//! In-process stand-in for the catalog API and the identity provider.
//!
//! Binds an axum router on an ephemeral port and counts every request so tests
//! can assert how often an endpoint was hit.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use genrescope::{
    management::OrchestratorSettings,
    spotify::{ApiClient, RetryPolicy},
};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

pub const TEST_TOKEN: &str = "test-token";

/// How the mock catalog misbehaves.
#[derive(Debug, Clone, Default)]
pub struct Behavior {
    pub tracks: Vec<Value>,
    pub genres: Vec<String>,
    /// Answer this many search requests with 429 before serving pages.
    pub search_rate_limits: usize,
    pub retry_after: Option<String>,
    pub search_status: Option<u16>,
    pub genre_status: Option<u16>,
    pub malformed_genres: bool,
    /// Audio feature ids answered with 500.
    pub failing_features: Vec<String>,
    /// Audio feature ids answered with 403.
    pub forbidden_features: Vec<String>,
    /// Audio feature ids answered with `{"audio_features": [null]}`.
    pub missing_features: Vec<String>,
    /// Analysis/track ids answered with 404.
    pub missing_analysis: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Hits {
    pub genres: AtomicUsize,
    pub search: AtomicUsize,
    pub features: AtomicUsize,
    pub analysis: AtomicUsize,
    pub tracks: AtomicUsize,
    pub token: AtomicUsize,
    pub features_by_id: Mutex<HashMap<String, usize>>,
    pub search_queries: Mutex<Vec<String>>,
    pub authorization: Mutex<Vec<String>>,
}

struct Catalog {
    base_url: String,
    behavior: Behavior,
    hits: Arc<Hits>,
    rate_limited: AtomicUsize,
}

pub struct MockCatalog {
    pub base_url: String,
    pub hits: Arc<Hits>,
}

impl MockCatalog {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock catalog");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let hits = Arc::new(Hits::default());

        let catalog = Arc::new(Catalog {
            base_url: base_url.clone(),
            behavior,
            hits: Arc::clone(&hits),
            rate_limited: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/recommendations/available-genre-seeds", get(genre_seeds))
            .route("/search", get(search))
            .route("/audio-features", get(audio_features))
            .route("/audio-analysis/{id}", get(audio_analysis))
            .route("/tracks/{id}", get(track_details))
            .route("/api/token", post(token))
            .with_state(catalog);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock catalog");
        });

        Self { base_url, hits }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn genre_hits(&self) -> usize {
        self.hits.genres.load(Ordering::SeqCst)
    }

    pub fn search_hits(&self) -> usize {
        self.hits.search.load(Ordering::SeqCst)
    }

    pub fn feature_hits(&self) -> usize {
        self.hits.features.load(Ordering::SeqCst)
    }

    pub fn feature_hits_for(&self, id: &str) -> usize {
        self.hits
            .features_by_id
            .lock()
            .expect("hits lock")
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn analysis_hits(&self) -> usize {
        self.hits.analysis.load(Ordering::SeqCst) + self.hits.tracks.load(Ordering::SeqCst)
    }

    pub fn token_hits(&self) -> usize {
        self.hits.token.load(Ordering::SeqCst)
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.hits.search_queries.lock().expect("hits lock").clone()
    }

    pub fn authorization_headers(&self) -> Vec<String> {
        self.hits.authorization.lock().expect("hits lock").clone()
    }
}

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn spawn_router(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind router");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("router");
    });
    base_url
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

/// A search item the way the catalog returns it.
pub fn raw_track(id: &str, name: &str, popularity: u32) -> Value {
    json!({
        "uri": format!("spotify:track:{}", id),
        "name": name,
        "popularity": popularity,
        "artists": [{ "name": format!("Artist {}", id) }],
        "album": {
            "name": format!("Album {}", id),
            "href": format!("https://api.spotify.com/v1/albums/{}", id),
            "uri": format!("spotify:album:{}", id),
            "images": [{ "url": format!("https://i.scdn.co/image/{}", id), "height": 640, "width": 640 }],
            "external_urls": { "spotify": format!("https://open.spotify.com/album/{}", id) }
        }
    })
}

/// `count` tracks with ids `t000`, `t001`, ... and scattered popularity.
pub fn tracks(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| raw_track(&format!("t{:03}", i), &format!("Track {}", i), ((i * 37) % 101) as u32))
        .collect()
}

/// Danceability the mock reports for an id: its digits divided by 1000.
pub fn danceability_of(id: &str) -> f64 {
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<f64>().unwrap_or(0.0) / 1000.0
}

/// The feature record the mocks report for `id`.
pub fn features_json(id: &str) -> Value {
    json!({
        "id": id,
        "danceability": danceability_of(id),
        "energy": 0.6,
        "loudness": -7.5,
        "speechiness": 0.05,
        "acousticness": 0.2,
        "instrumentalness": 0.0,
        "liveness": 0.1,
        "valence": 0.4,
        "tempo": 120.0
    })
}

/// Raw TCP stand-in for the audio features endpoint that hangs up without an
/// answer for selected ids, so those requests fail at the transport level.
pub struct DroppingCatalog {
    pub base_url: String,
    dropped: Arc<AtomicUsize>,
}

impl DroppingCatalog {
    pub async fn start(drop_ids: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind dropping catalog");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let dropped = Arc::new(AtomicUsize::new(0));
        let drop_ids = Arc::new(drop_ids);

        let counter = Arc::clone(&dropped);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let drop_ids = Arc::clone(&drop_ids);
                let counter = Arc::clone(&counter);
                tokio::spawn(answer_or_hang_up(socket, drop_ids, counter));
            }
        });

        Self { base_url, dropped }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

async fn answer_or_hang_up(
    mut socket: TcpStream,
    drop_ids: Arc<Vec<String>>,
    dropped: Arc<AtomicUsize>,
) {
    let mut buf = vec![0u8; 8192];
    let mut read = 0;
    loop {
        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        read += n;
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if read == buf.len() {
            return;
        }
    }

    let head = String::from_utf8_lossy(&buf[..read]);
    let id = head
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.split("ids=").nth(1))
        .unwrap_or_default()
        .to_string();

    if drop_ids.contains(&id) {
        dropped.fetch_add(1, Ordering::SeqCst);
        return;
    }

    let body = json!({ "audio_features": [features_json(&id)] }).to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Same shape as the production policy, with millisecond timings.
pub fn fast(policy: RetryPolicy) -> RetryPolicy {
    RetryPolicy {
        backoff_unit: Duration::from_millis(1),
        default_retry_after: Duration::from_millis(10),
        ..policy
    }
}

pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        search_debounce: Duration::from_millis(20),
        feature_debounce: Duration::ZERO,
        seed_policy: fast(RetryPolicy::genre_seeds()),
        page_policy: fast(RetryPolicy::pagination()),
        feature_policy: fast(RetryPolicy::audio_features()),
        analysis_policy: fast(RetryPolicy::pagination()),
    }
}

fn status(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": { "status": code } }))).into_response()
}

async fn genre_seeds(State(catalog): State<Arc<Catalog>>) -> Response {
    catalog.hits.genres.fetch_add(1, Ordering::SeqCst);

    if let Some(code) = catalog.behavior.genre_status {
        return status(code);
    }
    if catalog.behavior.malformed_genres {
        return Json(json!({ "seeds": 42 })).into_response();
    }
    Json(json!({ "genres": catalog.behavior.genres })).into_response()
}

async fn search(
    State(catalog): State<Arc<Catalog>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    catalog.hits.search.fetch_add(1, Ordering::SeqCst);
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        catalog
            .hits
            .authorization
            .lock()
            .expect("hits lock")
            .push(auth.to_string());
    }
    if let Some(q) = params.get("q") {
        catalog
            .hits
            .search_queries
            .lock()
            .expect("hits lock")
            .push(q.clone());
    }

    if catalog.rate_limited.load(Ordering::SeqCst) < catalog.behavior.search_rate_limits {
        catalog.rate_limited.fetch_add(1, Ordering::SeqCst);
        let mut response = status(429);
        if let Some(retry_after) = &catalog.behavior.retry_after {
            if let Ok(value) = retry_after.parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        return response;
    }

    if let Some(code) = catalog.behavior.search_status {
        return status(code);
    }

    let offset: usize = params
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let all = &catalog.behavior.tracks;
    let end = (offset + 50).min(all.len());
    let items: Vec<Value> = all.get(offset..end).map(<[Value]>::to_vec).unwrap_or_default();
    let next = (end < all.len())
        .then(|| format!("{}/search?cursor=page&offset={}", catalog.base_url, end));

    Json(json!({
        "tracks": {
            "items": items,
            "next": next,
            "total": all.len(),
        }
    }))
    .into_response()
}

async fn audio_features(
    State(catalog): State<Arc<Catalog>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    catalog.hits.features.fetch_add(1, Ordering::SeqCst);
    let id = params.get("ids").cloned().unwrap_or_default();
    *catalog
        .hits
        .features_by_id
        .lock()
        .expect("hits lock")
        .entry(id.clone())
        .or_insert(0) += 1;

    let behavior = &catalog.behavior;
    if behavior.failing_features.contains(&id) {
        return status(500);
    }
    if behavior.forbidden_features.contains(&id) {
        return status(403);
    }
    if behavior.missing_features.contains(&id) {
        return Json(json!({ "audio_features": [null] })).into_response();
    }

    Json(json!({ "audio_features": [features_json(&id)] })).into_response()
}

async fn audio_analysis(State(catalog): State<Arc<Catalog>>, Path(id): Path<String>) -> Response {
    catalog.hits.analysis.fetch_add(1, Ordering::SeqCst);
    if catalog.behavior.missing_analysis.contains(&id) {
        return status(404);
    }

    Json(json!({
        "sections": [
            { "start": 0.0, "duration": 30.5, "confidence": 1.0, "loudness": -9.1, "tempo": 120.0, "key": 5, "mode": 1 },
            { "start": 30.5, "duration": 60.0, "confidence": 0.8, "loudness": -6.4, "tempo": 121.0, "key": 5, "mode": 1 }
        ],
        "bars": [
            { "start": 0.0, "duration": 2.0, "confidence": 0.9 },
            { "start": 2.0, "duration": 2.0, "confidence": 0.9 }
        ],
        "beats": [
            { "start": 0.0, "duration": 0.5, "confidence": 0.9 },
            { "start": 0.5, "duration": 0.5, "confidence": 0.9 },
            { "start": 1.0, "duration": 0.5, "confidence": 0.9 },
            { "start": 1.5, "duration": 0.5, "confidence": 0.9 }
        ]
    }))
    .into_response()
}

async fn track_details(State(catalog): State<Arc<Catalog>>, Path(id): Path<String>) -> Response {
    catalog.hits.tracks.fetch_add(1, Ordering::SeqCst);
    if catalog.behavior.missing_analysis.contains(&id) {
        return status(404);
    }

    Json(json!({
        "id": id,
        "name": format!("Track {}", id),
        "popularity": 64,
        "artists": [{ "name": "Miles Davis" }, { "name": "John Coltrane" }]
    }))
    .into_response()
}

async fn token(
    State(catalog): State<Arc<Catalog>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    catalog.hits.token.fetch_add(1, Ordering::SeqCst);

    let valid = form.get("grant_type").map(String::as_str) == Some("refresh_token")
        && form.get("client_id").map(String::as_str) == Some("client-id")
        && form.get("client_secret").map(String::as_str) == Some("client-secret")
        && form.get("refresh_token").map(String::as_str) == Some("good-refresh-token");

    if !valid {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": "fresh-access-token",
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "user-read-private user-read-email"
    }))
    .into_response()
}
