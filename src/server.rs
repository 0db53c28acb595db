use std::{path::Path, sync::Arc};

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{error::ScanError, scanner::Scanner, types::ScanRequest};

#[derive(Clone)]
pub struct AppState {
    scanner: Arc<Scanner>, // immutable; shared by all requests
}

impl AppState {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner: Arc::new(scanner),
        }
    }
}

/// Uniform JSON reply for `/api/scan`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub target: String,
    pub scanner: String,
    pub scanner_available: bool,
    pub timeout_secs: u64,
}

impl ScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ScanError::ToolUnavailable { .. } | ScanError::Execution { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(Envelope::err(self.to_string()))).into_response()
    }
}

/// API routes plus the static UI as fallback.
pub fn router(state: AppState, ui_dir: impl AsRef<Path>) -> Router {
    let api = Router::new()
        .route("/options", get(get_options))
        .route("/target", get(get_target))
        .route("/status", get(get_status))
        .route("/scan", post(post_scan))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state);

    let static_svc = ServeDir::new(ui_dir.as_ref()).append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_svc)
        .layer(TraceLayer::new_for_http())
}

pub async fn spawn_server(bind: &str, scanner: Scanner, ui_dir: impl AsRef<Path>) -> Result<()> {
    let app = router(AppState::new(scanner), ui_dir);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Serving UI on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_options(State(app): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(*app.scanner.registry()))
}

async fn get_target(State(app): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "target": app.scanner.target() })))
}

async fn get_status(State(app): State<AppState>) -> impl IntoResponse {
    let cfg = app.scanner.config();
    let out = Status {
        target: cfg.target().to_string(),
        scanner: cfg.program().to_string(),
        scanner_available: app.scanner.is_available(),
        timeout_secs: cfg.timeout().as_secs(),
    };
    (StatusCode::OK, Json(out))
}

async fn post_scan(State(app): State<AppState>, body: Bytes) -> Response {
    let req = match parse_scan_request(&body) {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(Envelope::err(format!("invalid request body: {e}"))),
            )
                .into_response()
        }
    };

    match app.scanner.scan(&req).await {
        Ok(result) => (StatusCode::OK, Json(Envelope::ok(result))).into_response(),
        Err(e) => {
            warn!("scan error: {e}");
            e.into_response()
        }
    }
}

// Missing body, empty body and `null` all mean "no options".
fn parse_scan_request(body: &[u8]) -> serde_json::Result<ScanRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ScanRequest::default());
    }
    let req: Option<ScanRequest> = serde_json::from_slice(body)?;
    Ok(req.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ScanError::Timeout(Duration::from_secs(300)).status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ScanError::ToolUnavailable { program: "nmap".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn lenient_body_parsing() {
        assert!(parse_scan_request(b"").unwrap().options.is_empty());
        assert!(parse_scan_request(b"null").unwrap().options.is_empty());
        assert!(parse_scan_request(b"{}").unwrap().options.is_empty());
        assert_eq!(
            parse_scan_request(br#"{"options":["verbose"]}"#).unwrap().options,
            vec!["verbose".to_string()]
        );
        assert!(parse_scan_request(b"{not json").is_err());
    }

    #[test]
    fn error_envelope_shape() {
        let v = serde_json::to_value(Envelope::err("boom")).unwrap();
        assert_eq!(v, serde_json::json!({"success": false, "error": "boom"}));
    }
}
