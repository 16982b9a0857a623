//! The six management endpoints.
//!
//! Each handler validates its query, issues exactly one management call and
//! maps the outcome. Invalid input is rejected before any upstream contact.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::http::request::QueryParams;
use crate::http::response::{translate_upstream_error, ApiError, Operation};
use crate::http::server::AppState;
use crate::upstream::types::require_email;
use crate::upstream::{StatRecord, UserIdentity};

type Pairs = Query<Vec<(String, String)>>;

fn email_param(query: Vec<(String, String)>) -> Result<String, ApiError> {
    let params = QueryParams::from(query);
    require_email(params.get("email")).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request");
        ApiError::from(e)
    })
}

pub async fn add_user(
    State(state): State<AppState>,
    Query(query): Pairs,
) -> Result<StatusCode, ApiError> {
    let params = QueryParams::from(query);
    let identity = UserIdentity::parse(params.get("email"), params.get("uuid")).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request");
        ApiError::from(e)
    })?;

    state
        .api
        .add_user(&identity)
        .await
        .map_err(|e| translate_upstream_error(Operation::AddUser { email: &identity.email }, e))?;

    tracing::info!(email = %identity.email, "User added");
    Ok(StatusCode::OK)
}

pub async fn remove_user(
    State(state): State<AppState>,
    Query(query): Pairs,
) -> Result<StatusCode, ApiError> {
    let email = email_param(query)?;

    state
        .api
        .remove_user(&email)
        .await
        .map_err(|e| translate_upstream_error(Operation::RemoveUser { email: &email }, e))?;

    tracing::info!(email = %email, "User removed");
    Ok(StatusCode::OK)
}

pub async fn query_user_traffic(
    State(state): State<AppState>,
    Query(query): Pairs,
) -> Result<Json<Vec<StatRecord>>, ApiError> {
    let email = email_param(query)?;

    let stats = state
        .api
        .query_user_traffic(&email)
        .await
        .map_err(|e| translate_upstream_error(Operation::QueryStats, e))?;
    Ok(Json(stats))
}

pub async fn query_traffic(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatRecord>>, ApiError> {
    let stats = state
        .api
        .query_traffic()
        .await
        .map_err(|e| translate_upstream_error(Operation::QueryStats, e))?;
    Ok(Json(stats))
}

pub async fn reset_user_traffic(
    State(state): State<AppState>,
    Query(query): Pairs,
) -> Result<Json<Vec<StatRecord>>, ApiError> {
    let email = email_param(query)?;

    let stats = state
        .api
        .reset_user_traffic(&email)
        .await
        .map_err(|e| translate_upstream_error(Operation::QueryStats, e))?;

    tracing::info!(email = %email, counters = stats.len(), "User traffic reset");
    Ok(Json(stats))
}

pub async fn reset_traffic(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatRecord>>, ApiError> {
    let stats = state
        .api
        .reset_traffic()
        .await
        .map_err(|e| translate_upstream_error(Operation::QueryStats, e))?;

    tracing::info!(counters = stats.len(), "Traffic reset");
    Ok(Json(stats))
}
