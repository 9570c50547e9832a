//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{HealthDto, ParticipantDetailDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Get list of occupied rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let room_summaries = rooms
        .into_iter()
        .map(|(room, members)| RoomSummaryDto {
            room: room.into_string(),
            members,
        })
        .collect();

    Json(room_summaries)
}

/// Get the participants of one room
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail_usecase.execute(room).await {
        Ok((room, participants)) => Ok(Json(RoomDetailDto {
            room: room.into_string(),
            participants: participants.iter().map(ParticipantDetailDto::from).collect(),
        })),
        Err(GetRoomDetailError::RoomNotFound(room)) => {
            tracing::debug!("Room '{}' requested but has no members", room);
            Err(StatusCode::NOT_FOUND)
        }
    }
}
