//! HTTP surface of the connector.

use std::{future::Future, io, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::{
    bridge::{Bridge, SavedScreenshot},
    config::Config,
    socket::{EXTENSION_WS_PATH, extension_ws_handler},
};

pub const SERVICE_NAME: &str = "browser-connector";

#[derive(Clone)]
pub struct ConnectorState {
    pub bridge: Arc<Bridge>,
    pub port: u16,
    /// Limit for HTTP bodies and for single extension socket messages.
    pub max_body_bytes: usize,
}

impl ConnectorState {
    pub fn new(bridge: Arc<Bridge>, port: u16, max_body_bytes: usize) -> Self {
        Self {
            bridge,
            port,
            max_body_bytes,
        }
    }
}

pub fn create_router(state: ConnectorState) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route("/status", get(status))
        .route("/.port", get(port))
        .route("/settings", get(get_settings).post(update_settings))
        .route("/capture-screenshot", post(capture_screenshot))
        .route("/screenshot", post(save_screenshot))
        .route(
            "/selected-elements",
            get(get_selected_elements).delete(clear_selected_elements),
        )
        .route("/extension-log", post(extension_log))
        .route(EXTENSION_WS_PATH, get(extension_ws_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn port(State(state): State<ConnectorState>) -> String {
    state.port.to_string()
}

async fn get_settings(State(state): State<ConnectorState>) -> impl IntoResponse {
    Json(state.bridge.artifacts().settings())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsUpdate {
    #[serde(default)]
    screenshot_path: Option<String>,
}

/// Malformed or missing JSON bodies get the same `{error}` shape as every other failure.
fn rejection_response(rejection: JsonRejection) -> Response {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    let message = rejection.body_text();
    tracing::warn!("Rejected request body: {}", message);
    (status, Json(json!({ "error": message }))).into_response()
}

async fn update_settings(
    State(state): State<ConnectorState>,
    update: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Response {
    let Json(update) = match update {
        Ok(update) => update,
        Err(rejection) => return rejection_response(rejection),
    };
    if let Some(path) = update.screenshot_path.filter(|p| !p.is_empty()) {
        state.bridge.artifacts().set_destination(path);
    }
    Json(json!({ "status": "ok", "settings": state.bridge.artifacts().settings() })).into_response()
}

async fn capture_screenshot(State(state): State<ConnectorState>) -> Response {
    tracing::info!("Received request to capture screenshot");
    match state.bridge.capture_screenshot().await {
        Ok(saved) => Json(saved).into_response(),
        Err(e) => {
            tracing::error!("Error capturing screenshot: {}", e);
            e.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScreenshotUpload {
    #[serde(default)]
    data: Option<String>,
}

async fn save_screenshot(
    State(state): State<ConnectorState>,
    upload: Result<Json<ScreenshotUpload>, JsonRejection>,
) -> Response {
    let Json(upload) = match upload {
        Ok(upload) => upload,
        Err(rejection) => return rejection_response(rejection),
    };
    let Some(data) = upload.data.filter(|d| !d.is_empty()) else {
        tracing::warn!("Screenshot upload missing data");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing screenshot data" })),
        )
            .into_response();
    };

    match state.bridge.artifacts().write_artifact(&data, None).await {
        Ok(path) => Json(SavedScreenshot::from_path(path)).into_response(),
        Err(e) => {
            tracing::error!("Error saving screenshot: {}", e);
            e.into_response()
        }
    }
}

async fn get_selected_elements(State(state): State<ConnectorState>) -> impl IntoResponse {
    Json(json!({ "elements": state.bridge.elements().snapshot() }))
}

async fn clear_selected_elements(State(state): State<ConnectorState>) -> impl IntoResponse {
    let cleared = state.bridge.elements().clear();
    tracing::info!("Cleared {} selected elements", cleared);
    Json(json!({ "status": "ok" }))
}

async fn extension_log(body: Result<Json<Value>, JsonRejection>) -> Response {
    let body = body.map(|Json(body)| body).unwrap_or(Value::Null);
    let Some(data) = body.get("data").filter(|d| !d.is_null()) else {
        tracing::warn!("Extension log request without data");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "No data provided" })),
        )
            .into_response();
    };

    let kind = data.get("type").and_then(Value::as_str).unwrap_or("unknown");
    tracing::info!("Received extension log entry of type {}", kind);
    tracing::debug!("Extension log entry: {}", data);
    Json(json!({ "status": "ok" })).into_response()
}

/// A bound, not yet serving, connector.
pub struct ConnectorServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    bridge: Arc<Bridge>,
    max_body_bytes: usize,
}

impl ConnectorServer {
    pub async fn bind(config: &Config) -> io::Result<Self> {
        let listener = TcpListener::bind(config.bind_address()).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            bridge: Arc::new(Bridge::new(config)),
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn bridge(&self) -> Arc<Bridge> {
        self.bridge.clone()
    }

    pub async fn serve<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = ConnectorState::new(self.bridge, self.local_addr.port(), self.max_body_bytes);
        let router = create_router(state);

        tracing::info!("Browser connector listening on http://{}", self.local_addr);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
