use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{spotify::auth::verify_callback, types::ImplicitGrant, warning};

/// The implicit grant puts the token in the URL fragment, which never reaches
/// the server. This page hands the fragment back as a query string.
const FORWARD_FRAGMENT_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>genrescope</title></head>
  <body>
    <p>Completing authorization...</p>
    <script>
      const params = new URLSearchParams(window.location.hash.substring(1));
      window.location.replace("/callback/token?" + params.toString());
    </script>
  </body>
</html>"#;

pub async fn callback() -> Html<&'static str> {
    Html(FORWARD_FRAGMENT_PAGE)
}

pub async fn callback_token(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<ImplicitGrant>>>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(grant) = state.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    if grant.outcome.is_some() {
        return Html("<h4>Authorization already handled.</h4>");
    }

    // a stray request must not consume the pending grant
    if params.get("state") != Some(&grant.state) {
        warning!("Ignoring callback with an unexpected state");
        return Html("<h4>Login failed.</h4>");
    }

    match verify_callback(&grant.state, &params) {
        Ok(token) => {
            grant.outcome = Some(Ok(token));
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(e) => {
            warning!("Authorization callback rejected: {}", e);
            grant.outcome = Some(Err(e.to_string()));
            Html("<h4>Login failed.</h4>")
        }
    }
}
