use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use uuid::Uuid;

use asta_core::ServerDeps;
use asta_domains::trends;
use asta_domains::votes::{cast_vote, VoteOutcome};
use asta_domains::Property;

use crate::webhook;

pub fn build_router(deps: Arc<ServerDeps>) -> Router {
    let cors = if deps.config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = deps
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .route("/process", post(process))
        .route("/whatsapp", post(webhook::whatsapp))
        .route("/api/properties", get(api_properties))
        .route("/api/properties/{id}/vote", post(api_vote))
        .route("/api/trends", get(api_trends))
        .layer(cors)
        .with_state(deps)
}

async fn health() -> &'static str {
    "ok"
}

async fn status() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "Asta Engine Online",
        "brain": "Gemini Resilient",
    }))
}

#[derive(Deserialize)]
struct MessageInput {
    text: String,
}

/// JSON ingestion endpoint: free text in, stored structured record out.
async fn process(
    State(deps): State<Arc<ServerDeps>>,
    Json(input): Json<MessageInput>,
) -> impl IntoResponse {
    let draft = match deps.extractor.extract(&input.text).await {
        Ok(draft) => draft,
        Err(e) => {
            warn!(error = %e, "Extraction failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "AI extraction failed"})),
            )
                .into_response();
        }
    };

    match Property::save(&draft, deps.pool()).await {
        Some(property) => Json(serde_json::json!({
            "status": "success",
            "data": property,
        }))
        .into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database save failed"})),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct PropertiesQuery {
    limit: Option<i64>,
    offset: Option<i64>,
    location: Option<String>,
}

async fn api_properties(
    State(deps): State<Arc<ServerDeps>>,
    Query(query): Query<PropertiesQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let result = match query.location.as_deref().filter(|l| !l.trim().is_empty()) {
        Some(location) => Property::search_by_location(location, limit, deps.pool()).await,
        None => Property::find_active(limit, offset, deps.pool()).await,
    };

    match result {
        Ok(properties) => Json(properties).into_response(),
        Err(e) => {
            warn!(error = %e, "Property listing query failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize)]
struct VoteRequest {
    device_id: String,
    kind: String,
}

/// One trust vote per device per property.
async fn api_vote(
    State(deps): State<Arc<ServerDeps>>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<VoteRequest>,
) -> impl IntoResponse {
    let device_id = body.device_id.trim();
    if device_id.is_empty() || device_id.len() > 128 {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "device_id must be 1-128 characters"})),
        )
            .into_response();
    }

    match cast_vote(deps.pool(), property_id, device_id, &body.kind).await {
        Ok(VoteOutcome::Recorded(count)) => Json(serde_json::json!({
            "status": "recorded",
            "kind": body.kind.trim().to_lowercase(),
            "count": count,
        }))
        .into_response(),
        Ok(VoteOutcome::Duplicate) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "This device already voted on this property"})),
        )
            .into_response(),
        Ok(VoteOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Property not found"})),
        )
            .into_response(),
        Ok(VoteOutcome::InvalidKind) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "kind must be confirmed, suspicious, or scam"})),
        )
            .into_response(),
        Err(e) => {
            warn!(%property_id, error = %e, "Vote failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize)]
struct TrendsQuery {
    limit: Option<usize>,
}

async fn api_trends(
    State(deps): State<Arc<ServerDeps>>,
    Query(query): Query<TrendsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(10).min(50);

    match trends::top_tags(deps.pool(), limit).await {
        Ok(tags) => Json(tags).into_response(),
        Err(e) => {
            warn!(error = %e, "Trend aggregation failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
