//! Axum-based HTTP surface for the chronometer.
//!
//! Read-only views of the attributes plus the one writable setting:
//! - GET `/api/state` - Running flag, live time, replay flags, lap count, mode
//! - GET `/api/laps` - All laps in capture order
//! - GET `/api/laps/count` - Lap count
//! - GET `/api/laps/mode` - Lap display mode
//! - POST `/api/laps/mode` - Set lap display mode (`{"mode": 0 | 1}`)
//! - POST `/api/record` - Next sequential-read record (advances the stream cursor)
//!
//! Buttons are not exposed; the stopwatch is only driven by its keys.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::chrono::LapMode;
use crate::config::WebConfig;
use crate::traits::{Clock, LedSink, SegmentDisplay};

use super::api::{
    ApiResponse, CountResponse, LapResponse, ModeResponse, RecordResponse, SetLapModeRequest,
    StateResponse,
};
use super::shared::SharedChrono;

type AppState<C, D, L> = Arc<SharedChrono<C, D, L>>;

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/state - Returns the current chronometer state
async fn get_state<C, D, L>(
    State(state): State<AppState<C, D, L>>,
) -> Json<ApiResponse<StateResponse>>
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let snapshot = state.snapshot();
    Json(ApiResponse::ok(StateResponse::from(&snapshot)))
}

/// GET /api/laps - Returns every lap
async fn get_laps<C, D, L>(
    State(state): State<AppState<C, D, L>>,
) -> Json<ApiResponse<Vec<LapResponse>>>
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let laps = state.laps().iter().map(LapResponse::from).collect();
    Json(ApiResponse::ok(laps))
}

/// GET /api/laps/count - Returns the lap count
async fn get_count<C, D, L>(
    State(state): State<AppState<C, D, L>>,
) -> Json<ApiResponse<CountResponse>>
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let count = state.with_state(|s| s.lap_count());
    Json(ApiResponse::ok(CountResponse { count }))
}

/// GET /api/laps/mode - Returns the lap display mode
async fn get_mode<C, D, L>(
    State(state): State<AppState<C, D, L>>,
) -> Json<ApiResponse<ModeResponse>>
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let mode = state.with_state(|s| s.mode());
    Json(ApiResponse::ok(ModeResponse::from(mode)))
}

/// POST /api/laps/mode - Set the lap display mode
///
/// Accepts JSON: `{"mode": 1}`
async fn set_mode<C, D, L>(
    State(state): State<AppState<C, D, L>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse<ModeResponse>>)
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let Ok(request) = serde_json::from_slice::<SetLapModeRequest>(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("Invalid lap mode request")),
        );
    };

    let Some(mode) = LapMode::from_u8(request.mode) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("Lap mode must be 0 or 1")),
        );
    };

    state.set_mode(mode);
    (StatusCode::OK, Json(ApiResponse::ok(ModeResponse::from(mode))))
}

/// POST /api/record - Next sequential-read record
///
/// Not a GET: every call moves the shared stream cursor.
async fn next_record<C, D, L>(
    State(state): State<AppState<C, D, L>>,
) -> Json<ApiResponse<RecordResponse>>
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let record = state.next_record();
    Json(ApiResponse::ok(RecordResponse::from(&record)))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<C, D, L>(state: AppState<C, D, L>, config: &WebServerConfig) -> Router
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let mut router = Router::new()
        .route("/api/state", get(get_state::<C, D, L>))
        .route("/api/laps", get(get_laps::<C, D, L>))
        .route("/api/laps/count", get(get_count::<C, D, L>))
        .route(
            "/api/laps/mode",
            get(get_mode::<C, D, L>).post(set_mode::<C, D, L>),
        )
        .route("/api/record", post(next_record::<C, D, L>))
        .fallback(not_found)
        .with_state(state);

    // Add CORS if requested
    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Serve the HTTP surface until the server stops.
pub async fn run_server<C, D, L>(
    state: AppState<C, D, L>,
    config: WebServerConfig,
) -> Result<(), std::io::Error>
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "web server listening");

    axum::serve(listener, router).await
}
