//! HTTP routes and handlers.
//!
//! | Method | Path                  | Handler          |
//! |--------|-----------------------|------------------|
//! | POST   | `/v1/claims/submit`   | `submit_claim`   |
//! | GET    | `/v1/claims/:claimId` | `get_claim`      |
//! | GET    | `/health`             | `health_check`   |

use crate::domain::config::GatewayConfig;
use crate::domain::error::{codes, ApiError};
use crate::middleware::{bearer_token, create_cors_layer, TimeoutLayer};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pl_01_settlement_ledger::{Claim, SettlementApi, SubmissionReceipt, SubmitClaimRequest};
use shared_types::ClaimId;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn SettlementApi>,
}

impl AppState {
    pub fn new(api: Arc<dyn SettlementApi>) -> Self {
        Self { api }
    }
}

/// Build the gateway router with its middleware stack.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    // Each `layer` wraps everything added before it.
    Router::new()
        .route("/v1/claims/submit", post(submit_claim))
        .route("/v1/claims/:claim_id", get(get_claim))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(config.limits.max_request_size))
        .layer(TimeoutLayer::new(config.timeouts.request))
        .layer(create_cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The caller is resolved before the body is read, so a request without
/// valid credentials is 401/403 whatever its body holds.
async fn submit_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    raw: Request,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let token = bearer_token(&headers);
    state.api.authenticate(token.as_deref()).await?;

    let Json(request) = Json::<SubmitClaimRequest>::from_request(raw, &())
        .await
        .map_err(decode_rejection)?;

    let receipt = state.api.submit_claim(token.as_deref(), request).await?;
    Ok(Json(receipt))
}

fn decode_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::BytesRejection(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, codes::PAYLOAD_TOO_LARGE, e.body_text())
        }
        other => ApiError::malformed_body(other.body_text()),
    }
}

async fn get_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(claim_id): Path<String>,
) -> Result<Json<Claim>, ApiError> {
    let token = bearer_token(&headers);
    let claim = state
        .api
        .get_claim(token.as_deref(), &ClaimId::new(claim_id))
        .await?;
    Ok(Json(claim))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
