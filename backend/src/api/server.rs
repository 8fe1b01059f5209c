//! HTTP server exposing build data to consumers that pull it over HTTP.
//!
//! Every data request runs a fresh load; nothing is cached between requests.
//!
//! # API Endpoints
//!
//! | Method | Path           | Description                              |
//! |--------|----------------|------------------------------------------|
//! | GET    | `/health`      | Health check                             |
//! | GET    | `/api/data`    | `{ total, regions, completeData }`       |
//! | GET    | `/api/regions` | Current state of every region            |
//! | GET    | `/api/logs`    | SSE stream for real-time logs            |

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use reqwest::Client;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, RegionsResponse};
use crate::config::LoaderConfig;
use crate::error::{LoadError, ServerResult};
use crate::fetch::http_client;
use crate::models::HospitalizationData;
use crate::transform::pipeline::{load_with_client, LoadOutput};

type ApiError = (StatusCode, Json<Value>);

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LoaderConfig>,
    pub client: Client,
}

impl AppState {
    pub fn new(config: LoaderConfig, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/data", get(data))
        .route("/api/regions", get(regions))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16, config: LoaderConfig) -> ServerResult<()> {
    let client = http_client().map_err(LoadError::from)?;
    let source = config.source.describe();
    let app = router(AppState::new(config, client));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Hospit server running on http://localhost:{}", port);
    eprintln!("   GET /api/data    - Build data");
    eprintln!("   GET /api/regions - Region summary");
    eprintln!("   GET /api/logs    - SSE log stream");
    eprintln!("   GET /health      - Health check");
    eprintln!();
    eprintln!("📡 Source: {}", source);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "hospit",
        "version": env!("CARGO_PKG_VERSION"),
        "source": state.config.source.describe(),
        "endpoints": {
            "data": "GET /api/data",
            "regions": "GET /api/regions",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn data(State(state): State<AppState>) -> Result<Json<HospitalizationData>, ApiError> {
    let output = run_load(&state).await?;
    Ok(Json(output.data))
}

async fn regions(State(state): State<AppState>) -> Result<Json<RegionsResponse>, ApiError> {
    let output = run_load(&state).await?;
    Ok(Json(RegionsResponse::new(
        &output.data,
        &state.config.national_region,
        output.stats,
    )))
}

async fn run_load(state: &AppState) -> Result<LoadOutput, ApiError> {
    load_with_client(&state.client, &state.config)
        .await
        .map_err(|e| {
            log_error(format!("Load failed: {}", e));
            (status_for(&e), Json(error_response(&e.to_string())))
        })
}

fn status_for(err: &LoadError) -> StatusCode {
    match err {
        LoadError::Fetch(_) => StatusCode::BAD_GATEWAY,
        LoadError::Source(_) | LoadError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
