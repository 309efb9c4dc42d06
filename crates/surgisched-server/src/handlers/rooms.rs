use axum::extract::{Path, Query, State};
use serde::Deserialize;
use std::str::FromStr;

use crate::state::AppState;
use surgisched_api::{ApiError, ApiResponse};
use surgisched_core::{NewRoom, Room, RoomPatch, RoomStatus, ScheduleDateTime};
use surgisched_scheduling::{Availability, RoomDetails};
use surgisched_storage::{Page, RoomFilter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListQuery {
    #[serde(default)]
    pub status: Option<RoomStatus>,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

pub async fn create_room(
    State(state): State<AppState>,
    axum::Json(data): axum::Json<NewRoom>,
) -> Result<ApiResponse<Room>, ApiError> {
    let room = state.registry.create_room(data).await?;
    Ok(ApiResponse::created(room))
}

pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomListQuery>,
) -> Result<ApiResponse<Page<Room>>, ApiError> {
    let filter = RoomFilter {
        status: query.status,
        room_type: query.room_type,
    };
    let limit = state.pagination.clamp_limit(query.limit);
    let offset = query.offset.unwrap_or(0);
    let page = state.registry.list_rooms(&filter, limit, offset).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<RoomDetails>, ApiError> {
    let details = state.registry.get_room(&id).await?;
    Ok(ApiResponse::ok(details))
}

pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    axum::Json(patch): axum::Json<RoomPatch>,
) -> Result<ApiResponse<Room>, ApiError> {
    let room = state.registry.update_room(&id, patch).await?;
    Ok(ApiResponse::ok(room))
}

pub async fn deactivate_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Room>, ApiError> {
    let room = state.registry.deactivate_room(&id).await?;
    Ok(ApiResponse::ok(room))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub exclude_procedure_id: Option<String>,
}

pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<ApiResponse<Availability>, ApiError> {
    let start = ScheduleDateTime::from_str(&query.start)?;
    let result = state
        .lifecycle
        .checker()
        .check(
            &id,
            start,
            query.duration_minutes,
            query.exclude_procedure_id.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(result))
}
