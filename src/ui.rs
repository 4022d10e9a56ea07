//! Companion web UI.
//!
//! A single HTML form that uploads a PDF plus four margins, forwards them to
//! the API process configured in [`UiConfig::api_url`], and hands the padded
//! PDF back as a download. The UI never touches pdfium itself.

use crate::config::{Margins, UiConfig, DEFAULT_MARGIN};
use crate::server::OUTPUT_FILENAME;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared UI state: the API location and a pooled HTTP client.
#[derive(Clone)]
pub struct UiState {
    pub config: Arc<UiConfig>,
    pub client: reqwest::Client,
}

impl UiState {
    pub fn new(config: UiConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }
}

/// Build the UI router.
pub fn build_router(state: UiState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/convert", axum::routing::post(convert))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and run the UI until Ctrl-C.
pub async fn serve(config: UiConfig) -> std::io::Result<()> {
    let bind = config.bind_addr();
    let limit = config.max_upload_bytes;
    info!("UI forwarding to API at {}", config.api_url);
    let app = build_router(UiState::new(config), limit);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("UI listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::server::shutdown_signal())
        .await
}

/// The upload form.
pub async fn index() -> Html<String> {
    Html(render_form())
}

fn render_form() -> String {
    let margin_input = |name: &str, label: &str| {
        format!(
            r#"    <label>{label} <input type="number" name="{name}" min="0" step="1" value="{DEFAULT_MARGIN}"></label><br>
"#
        )
    };
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>PDF Margin Adder</title></head>
<body>
  <h1>PDF Margin Adder</h1>
  <form action="/convert" method="post" enctype="multipart/form-data">
    <label>Choose a PDF file <input type="file" name="file" accept=".pdf" required></label><br>
"#,
    );
    html.push_str(&margin_input("left", "Left Margin"));
    html.push_str(&margin_input("right", "Right Margin"));
    html.push_str(&margin_input("top", "Top Margin"));
    html.push_str(&margin_input("bottom", "Bottom Margin"));
    html.push_str(
        r#"    <button type="submit">Add Margins</button>
  </form>
</body>
</html>
"#,
    );
    html
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html><body><h1>PDF Margin Adder</h1><p>Error: {} - {}</p><p><a href=\"/\">Back</a></p></body></html>\n",
        status.as_u16(),
        escape_html(message)
    );
    (status, Html(body)).into_response()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Parse one margin field. Browsers send an empty string for a cleared input.
fn parse_margin(name: &str, text: &str) -> Result<u32, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(DEFAULT_MARGIN);
    }
    text.parse::<u32>()
        .map_err(|_| format!("{name} margin must be a whole number >= 0, got '{text}'"))
}

/// Forward the submitted form to the API.
pub async fn convert(State(state): State<UiState>, mut multipart: Multipart) -> Response {
    let mut margins = Margins::default();
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => return error_page(StatusCode::BAD_REQUEST, &e.body_text()),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(data) => upload = Some((filename, data.to_vec())),
                    Err(e) => return error_page(StatusCode::BAD_REQUEST, &e.body_text()),
                }
            }
            "left" | "right" | "top" | "bottom" => {
                let text = match field.text().await {
                    Ok(t) => t,
                    Err(e) => return error_page(StatusCode::BAD_REQUEST, &e.body_text()),
                };
                let value = match parse_margin(&name, &text) {
                    Ok(v) => v,
                    Err(msg) => return error_page(StatusCode::BAD_REQUEST, &msg),
                };
                match name.as_str() {
                    "left" => margins.left = value,
                    "right" => margins.right = value,
                    "top" => margins.top = value,
                    _ => margins.bottom = value,
                }
            }
            _ => {}
        }
    }

    let Some((filename, bytes)) = upload.filter(|(name, _)| !name.is_empty()) else {
        return error_page(StatusCode::BAD_REQUEST, "Please choose a PDF file");
    };

    let url = state.config.endpoint_url(&margins);
    info!("Forwarding '{}' ({} bytes) to {}", filename, bytes.len(), url);

    let part = match reqwest::multipart::Part::bytes(bytes)
        .file_name(filename)
        .mime_str("application/pdf")
    {
        Ok(p) => p,
        Err(e) => return error_page(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = match state.client.post(&url).multipart(form).send().await {
        Ok(r) => r,
        Err(e) => {
            error!("API unreachable at {}: {}", url, e);
            return error_page(StatusCode::BAD_GATEWAY, &format!("API unreachable: {e}"));
        }
    };

    let status = resp.status();
    let body = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to read API response: {}", e);
            return error_page(StatusCode::BAD_GATEWAY, &e.to_string());
        }
    };

    if !status.is_success() {
        warn!("API returned {}", status);
        let code = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return error_page(code, &String::from_utf8_lossy(&body));
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={OUTPUT_FILENAME}"),
            ),
        ],
        body,
    )
        .into_response()
}
