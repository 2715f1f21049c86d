//! REST handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/api/chain` | Chain the ledger lives on |
//! | `GET` | `/api/player` | Player record by address |
//! | `GET` | `/api/plot` | Plot record by address and plot index |
//! | `POST` | `/api/tx` | Submit a state-changing call |
//! | `GET` | `/api/tx/{id}` | Receipt of a submitted call |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use farmstead_ledger::wire::{
    OperationResponse, PlayerResponse, PlotResponse, ReceiptResponse, SubmitRequest,
};
use farmstead_types::{OperationId, PlayerAddress};
use tracing::debug;
use uuid::Uuid;

use crate::error::ProxyError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/player`.
#[derive(Debug, serde::Deserialize)]
pub struct PlayerQuery {
    /// Wallet address.
    pub address: Option<String>,
}

/// Query parameters for `GET /api/plot`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotQuery {
    /// Wallet address.
    pub address: Option<String>,
    /// Plot index.
    pub plot_id: Option<String>,
}

fn parse_address(raw: Option<&str>) -> Result<PlayerAddress, ProxyError> {
    let raw = raw.ok_or_else(|| ProxyError::InvalidQuery("missing address".to_owned()))?;
    raw.parse::<PlayerAddress>()
        .map_err(|e| ProxyError::InvalidQuery(e.to_string()))
}

fn parse_plot_id(raw: Option<&str>) -> Result<u32, ProxyError> {
    let raw = raw.ok_or_else(|| ProxyError::InvalidQuery("missing plotId".to_owned()))?;
    raw.parse::<u32>()
        .map_err(|e| ProxyError::InvalidQuery(format!("invalid plotId '{raw}': {e}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Chain the ledger lives on.
pub async fn get_chain(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.chain.clone())
}

/// Player record. Unknown players read as fresh players.
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlayerQuery>,
) -> Result<impl IntoResponse, ProxyError> {
    let address = parse_address(query.address.as_deref())?;
    let player = state.ledger.get_player(&address).await?;
    Ok(Json(PlayerResponse { player }))
}

/// Plot record. 404 when the plot was never initialized.
pub async fn get_plot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlotQuery>,
) -> Result<impl IntoResponse, ProxyError> {
    let address = parse_address(query.address.as_deref())?;
    let plot_id = parse_plot_id(query.plot_id.as_deref())?;
    let plot = state
        .ledger
        .get_plot(&address, plot_id)
        .await?
        .ok_or_else(|| ProxyError::NotFound(format!("plot {plot_id} of {address}")))?;
    Ok(Json(PlotResponse { plot }))
}

/// Relay a state-changing call to the ledger.
pub async fn submit_tx(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ProxyError> {
    debug!(address = %request.address, call = %request.call, "Relaying call");
    let operation = state.ledger.submit(&request.address, request.call).await?;
    Ok(Json(OperationResponse { operation }))
}

/// Receipt of a submitted call.
pub async fn get_tx(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ProxyError> {
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| ProxyError::InvalidQuery(format!("invalid operation id '{id_str}': {e}")))?;
    let receipt = state.ledger.poll_transaction(OperationId::from(id)).await?;
    Ok(Json(ReceiptResponse { receipt }))
}
