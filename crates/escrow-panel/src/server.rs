//! http surface: the panel page, a json api and a notification stream

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tower_http::trace::TraceLayer;

use crate::{
    error::PanelError,
    history::TransferRecord,
    panel::{BalanceReport, ContractInfo, PanelStatus, TransferForm, TransferPanel},
};

const INDEX_HTML: &str = include_str!("../static/index.html");

// === request/response types ===

#[derive(Deserialize)]
struct BalanceRequest {
    from_address: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            PanelError::Amount(_) => StatusCode::BAD_REQUEST,
            PanelError::TransferInProgress => StatusCode::CONFLICT,
            PanelError::InsufficientAllowance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PanelError::Chain(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// === handlers ===

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn info(State(panel): State<Arc<TransferPanel>>) -> Json<ContractInfo> {
    Json(panel.info().clone())
}

async fn status(State(panel): State<Arc<TransferPanel>>) -> Json<PanelStatus> {
    Json(panel.status())
}

async fn transfers(State(panel): State<Arc<TransferPanel>>) -> Json<Vec<TransferRecord>> {
    Json(panel.history())
}

async fn check_balance(
    State(panel): State<Arc<TransferPanel>>,
    Json(req): Json<BalanceRequest>,
) -> Result<Json<BalanceReport>, PanelError> {
    panel.check_balance(&req.from_address).await.map(Json)
}

async fn transfer(
    State(panel): State<Arc<TransferPanel>>,
    Json(form): Json<TransferForm>,
) -> Result<Json<TransferRecord>, PanelError> {
    // detached so a closed page can't cancel a submitted transfer mid-wait
    let task = tokio::spawn(async move { panel.handle_transfer(form).await });

    let record = task
        .await
        .map_err(|e| PanelError::Internal(e.to_string()))??;
    Ok(Json(record))
}

async fn events(
    State(panel): State<Arc<TransferPanel>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(panel.subscribe()).filter_map(|item| {
        // lagged receivers just skip what they missed
        let notification = item.ok()?;
        Event::default()
            .event("notification")
            .json_data(&notification)
            .ok()
            .map(Ok::<_, Infallible>)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// routes for one panel instance
///
/// same-origin only: no cors headers are ever sent
pub fn router(panel: Arc<TransferPanel>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/info", get(info))
        .route("/api/status", get(status))
        .route("/api/transfers", get(transfers))
        .route("/api/balance", post(check_balance))
        .route("/api/transfer", post(transfer))
        .route("/api/events", get(events))
        .layer(TraceLayer::new_for_http())
        .with_state(panel)
}
