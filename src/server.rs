use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;

use crate::address::validate_digest;
use crate::error::{ErrorCategory, InterpretError};
use crate::interpreter::{InterpretedTransaction, TransactionInterpreter};
use crate::record::TransactionRecord;
use crate::rpc::{NetworkInfo, TransactionSource};

#[derive(Deserialize)]
struct DigestRequest {
    digest: String,
}

// Application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TransactionSource>,
    pub interpreter: Arc<TransactionInterpreter>,
    pub network: Arc<NetworkInfo>,
}

/// Rich error body; `retriable` tells callers whether resubmitting may help.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    retriable: bool,
}

pub struct ApiError(InterpretError);

impl From<InterpretError> for ApiError {
    fn from(err: InterpretError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::Cancelled => StatusCode::REQUEST_TIMEOUT,
        };
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.0.to_string(),
            retriable: self.0.is_retriable(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/network", get(get_network))
        .route("/digest/:digest", get(interpret_transaction))
        .route("/digest", post(interpret_transaction_post))
        .route("/ai-digest/:digest", get(explain_transaction))
        .route("/ai-digest", post(explain_transaction_post))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_network(State(state): State<AppState>) -> Json<NetworkInfo> {
    Json(state.network.as_ref().clone())
}

async fn interpret_transaction(
    Path(digest): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<InterpretedTransaction>, ApiError> {
    interpret(&state, &digest).await.map(Json)
}

async fn interpret_transaction_post(
    State(state): State<AppState>,
    Json(payload): Json<DigestRequest>,
) -> Result<Json<InterpretedTransaction>, ApiError> {
    interpret(&state, &payload.digest).await.map(Json)
}

async fn explain_transaction(
    Path(digest): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<InterpretedTransaction>, ApiError> {
    explain(&state, &digest).await.map(Json)
}

async fn explain_transaction_post(
    State(state): State<AppState>,
    Json(payload): Json<DigestRequest>,
) -> Result<Json<InterpretedTransaction>, ApiError> {
    explain(&state, &payload.digest).await.map(Json)
}

async fn interpret(state: &AppState, digest: &str) -> Result<InterpretedTransaction, ApiError> {
    let record = fetch(state, digest).await?;
    state.interpreter.interpret(&record).map_err(|e| {
        warn!("Error interpreting transaction {}: {}", digest, e);
        e.into()
    })
}

async fn explain(state: &AppState, digest: &str) -> Result<InterpretedTransaction, ApiError> {
    // Dropping this handler (client gone, request timeout) cancels the token
    // and with it any provider call still in flight.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let record = fetch(state, digest).await?;
    state
        .interpreter
        .interpret_with_explanation(&record, &cancel)
        .await
        .map_err(|e| {
            warn!("Error explaining transaction {}: {}", digest, e);
            e.into()
        })
}

async fn fetch(state: &AppState, digest: &str) -> Result<TransactionRecord, InterpretError> {
    validate_digest(digest)?;
    state.source.fetch(digest).await.map_err(|e| {
        warn!("Error fetching transaction {}: {}", digest, e);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn render(err: InterpretError) -> (StatusCode, Value) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn cancelled_requests_are_reported_as_request_timeout() {
        let (status, body) = render(InterpretError::Cancelled).await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["code"], 408);
        assert_eq!(body["retriable"], true);
    }

    #[tokio::test]
    async fn every_category_has_its_own_status() {
        let cases = [
            (InterpretError::MissingSenderAddress, StatusCode::BAD_REQUEST),
            (
                InterpretError::TransactionNotFound("x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                InterpretError::NodeUnavailable("x".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            let (status, body) = render(err).await;
            assert_eq!(status, expected);
            assert_eq!(body["code"], expected.as_u16());
        }
    }
}
