use axum::response::Json;
use serde_json::{Value, json};

/// Liveness probe shared by the callback server and the refresh proxy.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
