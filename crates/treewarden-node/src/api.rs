//! HTTP API server for the Treewarden node.
//!
//! Decodes edge requests from the URL path, hands them to the
//! [`NetworkManager`](treewarden_core::NetworkManager) and encodes the outcome.
//! A refused grant is reported as `409 Conflict`; indices outside the
//! configured range as `400 Bad Request`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use treewarden_core::{ArbiterError, Destination, EdgeGrant, NodeId};

use crate::state::AppState;

// --- Path parameters ---

#[derive(Debug, Deserialize)]
pub struct EdgePath {
    pub network_id: String,
    pub objective: String,
    pub destination: Destination,
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Deserialize)]
pub struct GraphPath {
    pub network_id: String,
    pub objective: String,
    pub destination: Destination,
}

// --- Response types ---

#[derive(Debug, Serialize, Deserialize)]
pub struct GrantResponse {
    /// Lease expiration, in seconds since the Unix epoch.
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub released: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgesResponse {
    pub edges: Vec<EdgeGrant>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub network_count: usize,
    pub max_nodes: usize,
    pub lease_duration_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn arbiter_error(e: ArbiterError) -> ApiError {
    let status = match e {
        ArbiterError::NodeOutOfRange { .. } | ArbiterError::DestinationOutOfRange { .. } => {
            StatusCode::BAD_REQUEST
        }
        ArbiterError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

// --- Handlers ---

pub async fn handle_request_edge(
    State(state): State<Arc<AppState>>,
    Path(p): Path<EdgePath>,
) -> Result<Json<GrantResponse>, ApiError> {
    tracing::info!(
        network_id = %p.network_id,
        objective = %p.objective,
        destination = p.destination,
        from = p.from,
        to = p.to,
        "edge requested"
    );

    let result = state
        .networks
        .request_edge(&p.network_id, &p.objective, p.destination, p.from, p.to)
        .map_err(arbiter_error)?;

    match result {
        Some(expires_at) => {
            tracing::info!(
                network_id = %p.network_id,
                objective = %p.objective,
                destination = p.destination,
                from = p.from,
                to = p.to,
                %expires_at,
                "edge granted"
            );
            Ok(Json(GrantResponse {
                expires_at: expires_at.timestamp(),
            }))
        }
        None => {
            tracing::info!(
                network_id = %p.network_id,
                objective = %p.objective,
                destination = p.destination,
                from = p.from,
                to = p.to,
                "edge refused"
            );
            let reason = if p.from == p.to {
                format!("edge {} -> {} refused: self-edges are never granted", p.from, p.to)
            } else {
                format!("edge {} -> {} refused: would form a loop", p.from, p.to)
            };
            Err(error_response(StatusCode::CONFLICT, reason))
        }
    }
}

pub async fn handle_release_edge(
    State(state): State<Arc<AppState>>,
    Path(p): Path<EdgePath>,
) -> Result<Json<ReleaseResponse>, ApiError> {
    tracing::info!(
        network_id = %p.network_id,
        objective = %p.objective,
        destination = p.destination,
        from = p.from,
        to = p.to,
        "edge release requested"
    );

    state
        .networks
        .release_edge(&p.network_id, &p.objective, p.destination, p.from, p.to)
        .map_err(arbiter_error)?;

    tracing::info!(
        network_id = %p.network_id,
        objective = %p.objective,
        destination = p.destination,
        from = p.from,
        to = p.to,
        "edge released"
    );
    Ok(Json(ReleaseResponse { released: true }))
}

pub async fn handle_live_edges(
    State(state): State<Arc<AppState>>,
    Path(p): Path<GraphPath>,
) -> Result<Json<EdgesResponse>, ApiError> {
    let edges = state
        .networks
        .live_edges(&p.network_id, &p.objective, p.destination)
        .map_err(arbiter_error)?;
    let count = edges.len();
    Ok(Json(EdgesResponse { edges, count }))
}

pub async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let config = state.networks.config();
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        network_count: state.networks.network_count(),
        max_nodes: config.max_nodes,
        lease_duration_secs: config.lease_duration.as_secs(),
    })
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/status", get(handle_status))
        .route(
            "/network/{network_id}/graphs/{objective}/{destination}/edges",
            get(handle_live_edges),
        )
        .route(
            "/network/{network_id}/graphs/{objective}/{destination}/edges/{from}/{to}/request",
            post(handle_request_edge),
        )
        .route(
            "/network/{network_id}/graphs/{objective}/{destination}/edges/{from}/{to}/release",
            post(handle_release_edge),
        )
        .with_state(state)
}

pub async fn start_api_server(listen_addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
