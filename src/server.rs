//! HTTP API: the single padding endpoint plus a health probe.
//!
//! ```text
//! POST /pdf_to_pdf_with_margin/?left=50&right=50&top=50&bottom=50
//!      multipart: file=<name>.pdf
//! → 200 application/pdf, attachment; filename=margined_pdf.pdf
//! ```
//!
//! Every handler is stateless apart from the shared, immutable
//! [`PipelineConfig`]. Document work runs on tokio's blocking pool.

use crate::config::{Margins, PipelineConfig, ServerConfig, DEFAULT_MARGIN};
use crate::convert;
use crate::error::MarginError;
use crate::pipeline::input;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Route of the padding endpoint.
pub const ENDPOINT: &str = "/pdf_to_pdf_with_margin/";

/// Filename of every successful download.
pub const OUTPUT_FILENAME: &str = "margined_pdf.pdf";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PipelineConfig>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Margin query parameters. Signed so negative values reach validation
/// instead of failing deserialisation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarginQuery {
    #[serde(default = "default_margin")]
    pub left: i64,
    #[serde(default = "default_margin")]
    pub right: i64,
    #[serde(default = "default_margin")]
    pub top: i64,
    #[serde(default = "default_margin")]
    pub bottom: i64,
}

fn default_margin() -> i64 {
    i64::from(DEFAULT_MARGIN)
}

impl Default for MarginQuery {
    fn default() -> Self {
        Self {
            left: default_margin(),
            right: default_margin(),
            top: default_margin(),
            bottom: default_margin(),
        }
    }
}

impl IntoResponse for MarginError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.public_message();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

/// Build the API router.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(ENDPOINT, post(pdf_to_pdf_with_margin))
        .route(
            ENDPOINT.trim_end_matches('/'),
            post(pdf_to_pdf_with_margin),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and run the API until Ctrl-C.
pub async fn serve(server: ServerConfig, pipeline: PipelineConfig) -> std::io::Result<()> {
    let app = build_router(AppState::new(pipeline), server.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(server.bind_addr()).await?;
    info!("API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub(crate) async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// Health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Pad every page of the uploaded PDF.
pub async fn pdf_to_pdf_with_margin(
    State(state): State<AppState>,
    Query(query): Query<MarginQuery>,
    mut multipart: Multipart,
) -> Result<Response, MarginError> {
    let mut query = query;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MarginError::MalformedRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                // Reject before the payload is read.
                input::validate_filename(&filename)?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| MarginError::MalformedRequest(e.body_text()))?;
                upload = Some((filename, data.to_vec()));
            }
            "left" | "right" | "top" | "bottom" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| MarginError::MalformedRequest(e.body_text()))?;
                let value: i64 = text.trim().parse().map_err(|_| {
                    MarginError::MalformedRequest(format!("{name} must be an integer, got '{text}'"))
                })?;
                match name.as_str() {
                    "left" => query.left = value,
                    "right" => query.right = value,
                    "top" => query.top = value,
                    _ => query.bottom = value,
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) = upload.ok_or(MarginError::MissingFile)?;
    let margins = Margins::try_new(query.left, query.right, query.top, query.bottom)?;
    info!("Padding '{}' ({} bytes, {})", filename, bytes.len(), margins);

    let document = convert::pad_document(bytes, margins, Arc::clone(&state.config)).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={OUTPUT_FILENAME}"),
            ),
        ],
        document.pdf,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn query_defaults_to_fifty() {
        let q: MarginQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((q.left, q.right, q.top, q.bottom), (50, 50, 50, 50));
    }

    #[test]
    fn query_keeps_negative_values_for_validation() {
        let q: MarginQuery = serde_json::from_str(r#"{"left": -5}"#).unwrap();
        assert_eq!(q.left, -5);
        assert!(Margins::try_new(q.left, q.right, q.top, q.bottom).is_err());
    }

    #[tokio::test]
    async fn client_error_renders_json_400() {
        let resp = MarginError::InvalidInput {
            filename: "a.txt".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 400);
        assert!(json["error"].as_str().unwrap().contains("Only PDF files"));
    }

    #[tokio::test]
    async fn processing_error_renders_json_500() {
        let resp = MarginError::RenderFailed {
            page: 2,
            detail: "bitmap allocation failed".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let msg = json["error"].as_str().unwrap();
        assert!(msg.starts_with("An error occurred: "), "got: {msg}");
        assert!(msg.contains("bitmap allocation failed"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(v) = health().await;
        assert_eq!(v["status"], "ok");
    }
}
