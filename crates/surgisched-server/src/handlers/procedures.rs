use axum::extract::{Path, State};
use serde::Deserialize;

use crate::middleware::UserContext;
use crate::state::AppState;
use surgisched_api::{ApiError, ApiResponse};
use surgisched_core::{
    CompleteProcedure, NewProcedure, Procedure, ProcedurePatch, ScheduleDateTime,
};

pub async fn create_procedure(
    State(state): State<AppState>,
    user: UserContext,
    axum::Json(data): axum::Json<NewProcedure>,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state.lifecycle.create(data, user.as_str()).await?;
    Ok(ApiResponse::created(procedure))
}

pub async fn get_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state.lifecycle.get(&id).await?;
    Ok(ApiResponse::ok(procedure))
}

pub async fn update_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserContext,
    axum::Json(patch): axum::Json<ProcedurePatch>,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state.lifecycle.update(&id, patch, user.as_str()).await?;
    Ok(ApiResponse::ok(procedure))
}

pub async fn start_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserContext,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state.lifecycle.start(&id, user.as_str()).await?;
    Ok(ApiResponse::ok(procedure))
}

pub async fn complete_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserContext,
    axum::Json(data): axum::Json<CompleteProcedure>,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state.lifecycle.complete(&id, data, user.as_str()).await?;
    Ok(ApiResponse::ok(procedure))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub reason: String,
}

pub async fn cancel_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserContext,
    axum::Json(body): axum::Json<CancelRequest>,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state
        .lifecycle
        .cancel(&id, &body.reason, user.as_str())
        .await?;
    Ok(ApiResponse::ok(procedure))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferRequest {
    #[serde(default)]
    pub new_date: Option<ScheduleDateTime>,
    pub reason: String,
}

pub async fn defer_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserContext,
    axum::Json(body): axum::Json<DeferRequest>,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state
        .lifecycle
        .defer(&id, body.new_date, &body.reason, user.as_str())
        .await?;
    Ok(ApiResponse::ok(procedure))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReprogramRequest {
    pub new_date: ScheduleDateTime,
}

pub async fn reprogram_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserContext,
    axum::Json(body): axum::Json<ReprogramRequest>,
) -> Result<ApiResponse<Procedure>, ApiError> {
    let procedure = state
        .lifecycle
        .reprogram(&id, body.new_date, user.as_str())
        .await?;
    Ok(ApiResponse::ok(procedure))
}
