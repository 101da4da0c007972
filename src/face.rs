use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::brain::Brain;
use crate::error::AnalyzeError;
use crate::hands::Hands;
use crate::pipeline;

/// How many consecutive ports to try when the requested one is taken.
const PORT_ATTEMPTS: u16 = 10;

#[derive(Clone)]
pub struct AppState {
    pub hands: Hands,
    pub brain: Brain,
}

#[derive(Deserialize)]
struct ConvertPayload {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPayload {
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    use_flash: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzePayload {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    use_flash: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/html-converter", post(html_converter_handler))
        .route("/api/gemini", post(gemini_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(Arc::new(state))
}

/// Bind `host:port`, falling back to the next few ports if it is in use.
pub async fn bind(host: &str, port: u16) -> anyhow::Result<(TcpListener, u16)> {
    for p in port..port.saturating_add(PORT_ATTEMPTS) {
        match TcpListener::bind((host, p)).await {
            Ok(listener) => return Ok((listener, p)),
            Err(e) => warn!("Port {} unavailable: {}", p, e),
        }
    }
    anyhow::bail!(
        "Could not bind to any port {}-{} on {}",
        port,
        port.saturating_add(PORT_ATTEMPTS - 1),
        host
    )
}

pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn html_converter_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConvertPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            error!("Error analysing page: {}", rejection);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to analyse page",
                    "details": rejection.body_text(),
                    "status": null,
                })),
            )
                .into_response();
        }
    };

    let Some(url) = payload.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "URL is required" })),
        )
            .into_response();
    };

    info!("POST /api/html-converter: {}", url);
    match pipeline::inventory(&state.hands, &url).await {
        Ok(elements) => Json(json!({ "success": true, "elements": elements })).into_response(),
        Err(e) => analysis_failure(e),
    }
}

async fn gemini_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeminiPayload>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid JSON in request body" })),
        )
            .into_response();
    };

    let Some(input) = payload.input.filter(is_present) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing required field: input" })),
        )
            .into_response();
    };

    let input = match input {
        Value::String(s) => s,
        other => other.to_string(),
    };

    info!("POST /api/gemini ({} chars, flash={})", input.len(), payload.use_flash);
    match state.brain.generate(&input, payload.use_flash).await {
        Ok(text) => Json(json!({ "text": text })).into_response(),
        Err(e) => {
            error!("Error generating content: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Error generating content" })),
            )
                .into_response()
        }
    }
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzePayload>, JsonRejection>,
) -> Response {
    let Some((url, use_flash)) = payload
        .ok()
        .and_then(|Json(p)| p.url.map(|u| (u, p.use_flash)))
        .filter(|(u, _)| !u.trim().is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "URL is required" })),
        )
            .into_response();
    };

    info!("POST /api/analyze: {}", url);
    match pipeline::analyze(&state.hands, &state.brain, &url, use_flash).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => analysis_failure(e),
    }
}

fn analysis_failure(e: AnalyzeError) -> Response {
    error!("Error analysing page: {}", e);
    let upstream = e.upstream_status();
    let status = upstream
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "success": false,
            "error": "Failed to analyse page",
            "details": e.to_string(),
            "status": upstream,
        })),
    )
        .into_response()
}

/// Null, false, zero and empty strings count as a missing input.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Tag Scout</title>
<style>
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body {
    background: #0a0a0f;
    color: #e0e0e0;
    font-family: 'Segoe UI', system-ui, -apple-system, sans-serif;
    padding: 32px;
  }
  h1 { font-size: 22px; margin-bottom: 20px; color: #fff; }
  form { display: flex; gap: 8px; margin-bottom: 16px; max-width: 900px; }
  #url {
    flex: 1;
    background: #111118;
    border: 1px solid #222;
    border-radius: 8px;
    padding: 12px 16px;
    color: #fff;
    font-size: 16px;
    outline: none;
  }
  #url:focus { border-color: #6366f1; }
  button {
    background: #6366f1;
    color: #fff;
    border: none;
    border-radius: 8px;
    padding: 12px 24px;
    font-size: 15px;
    font-weight: 600;
    cursor: pointer;
  }
  button:disabled { background: #333; cursor: not-allowed; }
  #count { color: #888; margin-bottom: 16px; }
  #cards {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
    gap: 16px;
  }
  .card {
    background: #111118;
    border-left: 3px solid #6366f1;
    border-radius: 8px;
    padding: 14px;
    word-break: break-word;
  }
  .card h2 { font-size: 16px; margin-bottom: 8px; color: #fff; }
  .card code { display: block; margin-top: 8px; color: #a5b4fc; font-size: 12px; }
  .empty { color: #666; }
</style>
</head>
<body>
  <h1>Tag Scout</h1>
  <form id="form">
    <input type="url" id="url" placeholder="Enter website URL" required />
    <button type="submit" id="go">Scan Website</button>
  </form>
  <p id="count">Number of recommendations: 0</p>
  <div id="cards"><p class="empty">No recommendations available</p></div>
<script>
  const form = document.getElementById('form');
  const go = document.getElementById('go');
  const cards = document.getElementById('cards');
  const count = document.getElementById('count');

  function esc(s) {
    return String(s).replace(/&/g, '&amp;').replace(/</g, '&lt;');
  }

  function render(recs) {
    count.textContent = 'Number of recommendations: ' + recs.length;
    if (!recs.length) {
      cards.innerHTML = '<p class="empty">No recommendations available</p>';
      return;
    }
    cards.innerHTML = recs.map(r =>
      '<div class="card"><h2>' + esc(r.element) + '</h2><p>' + esc(r.reason) + '</p>' +
      (r.selectorCode ? '<code>' + esc(r.selectorCode) + '</code>' : '') + '</div>'
    ).join('');
  }

  form.addEventListener('submit', async e => {
    e.preventDefault();
    go.disabled = true;
    go.textContent = 'Scanning...';
    render([]);
    try {
      const res = await fetch('/api/analyze', {
        method: 'POST',
        headers: {'Content-Type': 'application/json'},
        body: JSON.stringify({url: document.getElementById('url').value}),
      });
      const data = await res.json();
      render(res.ok ? data.recommendations : []);
    } catch (err) {
      render([]);
    } finally {
      go.disabled = false;
      go.textContent = 'Scan Website';
    }
  });
</script>
</body>
</html>
"##;
