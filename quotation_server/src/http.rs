//! HTTP surface of the quotation server.
//!
//! One endpoint, `GET /cotacao`, runs the chain fetch → persist → respond.
//! Each stage has its own deadline and its own fixed error body; the detailed
//! cause is only logged locally.
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use quotation_common::net::QUOTATION_PATH;
use quotation_common::{Quotation, QuotationError, Result};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::config::Deadlines;
use crate::store::{QuotationStore, persist};
use crate::upstream::UpstreamClient;

/// Wire message when the upstream fetch fails.
pub const FETCH_FAILURE: &str = "Erro ao consultar cotação!";
/// Wire message when the persistence write fails.
pub const PERSIST_FAILURE: &str = "Erro ao gravar cotação!";

/// Shared state for the HTTP server.
#[derive(Clone)]
pub struct QuotationServer {
    upstream: UpstreamClient,
    store: Arc<dyn QuotationStore>,
    deadlines: Deadlines,
}

impl QuotationServer {
    /// Create a server state with the default deadlines.
    pub fn new(upstream: UpstreamClient, store: Arc<dyn QuotationStore>) -> Self {
        Self {
            upstream,
            store,
            deadlines: Deadlines::default(),
        }
    }

    /// Replace the per-stage deadlines.
    pub fn with_deadlines(mut self, deadlines: Deadlines) -> Self {
        self.deadlines = deadlines;
        self
    }
}

/// Create the Axum router exposing the quotation endpoint.
pub fn create_router(server: QuotationServer) -> Router {
    Router::new()
        .route(QUOTATION_PATH, get(get_quotation))
        .with_state(server)
}

/// Serve the router on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, server: QuotationServer) -> Result<()> {
    info!("Quotation server listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(server))
        .await
        .map_err(QuotationError::Io)
}

/// Fetch, persist, respond. The write starts only after the fetch succeeded and
/// gets a fresh budget of its own.
async fn get_quotation(
    State(server): State<QuotationServer>,
) -> std::result::Result<Json<Quotation>, ApiError> {
    let quotation = server
        .upstream
        .fetch(server.deadlines.fetch)
        .await
        .map_err(|e| {
            error!("Failed to fetch quotation from {}: {}", server.upstream.url(), e);
            ApiError::Fetch
        })?;

    persist(server.store.as_ref(), &quotation, server.deadlines.persist)
        .await
        .map_err(|e| {
            error!("Failed to store quotation: {}", e);
            ApiError::Persist
        })?;

    info!("Quotation served: {} bid={}", quotation.code, quotation.bid);
    Ok(Json(quotation))
}

/// JSON body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Fixed, user-facing message.
    pub error: String,
}

/// Stage at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// Upstream fetch failed or timed out.
    Fetch,
    /// Persistence write failed or timed out.
    Persist,
}

impl ApiError {
    /// Fixed message sent on the wire for this stage.
    pub fn message(self) -> &'static str {
        match self {
            ApiError::Fetch => FETCH_FAILURE,
            ApiError::Persist => PERSIST_FAILURE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
