//! HTTP handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::FinnestError;
use crate::insights::InsightsRequest;
use crate::services::{CreateShareRequest, ShareService};

use super::AppState;

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "ok": false, "error": message.into() }))).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct CompareParams {
    pub base: Option<String>,
    pub quote: Option<String>,
}

/// `GET /api/fx/compare?base=AUD&quote=USD`
pub async fn compare_rates(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Response {
    let base = params
        .base
        .unwrap_or_else(|| "AUD".to_string())
        .to_uppercase();
    let quote = params
        .quote
        .unwrap_or_else(|| "USD".to_string())
        .to_uppercase();

    match state.fx.compare(&base, &quote).await {
        Ok(results) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, state.cache_control.clone())],
            Json(json!({
                "ok": true,
                "base": base,
                "quote": quote,
                "results": results,
            })),
        )
            .into_response(),
        Err(e) if e.is_validation() => failure(StatusCode::BAD_REQUEST, "Invalid currency pair"),
        Err(e) => {
            error!(error = %e, "fx compare failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `POST /api/insights`; an unreadable body counts as an empty snapshot
pub async fn generate_insights(State(state): State<AppState>, body: Bytes) -> Response {
    let request = InsightsRequest::from_body(&body);
    let response = state.insights.generate(&request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// `POST /api/shares`
pub async fn create_share(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CreateShareRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let service = ShareService::new(&state.storage, &state.public_url);
    match service.create(request) {
        Ok(created) => {
            info!(token = %created.token, "share created");
            (
                StatusCode::OK,
                Json(json!({ "ok": true, "token": created.token, "url": created.url })),
            )
                .into_response()
        }
        Err(e @ (FinnestError::Validation(_) | FinnestError::NotFound { .. })) => {
            failure(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "share creation failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `GET /api/shares/{token}`
pub async fn resolve_share(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let service = ShareService::new(&state.storage, &state.public_url);
    match service.resolve(&token) {
        Ok(view) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "share": view.share, "assets": view.assets })),
        )
            .into_response(),
        Err(e) if e.is_not_found() => failure(StatusCode::NOT_FOUND, "Not found"),
        Err(e) => {
            error!(error = %e, "share lookup failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
