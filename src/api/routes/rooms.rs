//! Room Routes
//!
//! - POST /api/v1/rooms - Generate a new room

use axum::{http::StatusCode, Json};

use crate::api::dto::NewRoomResponse;
use crate::render::page_path;
use crate::storage::Room;

/// POST /api/v1/rooms
///
/// Rooms need no setup; the store file appears on the first submission.
pub async fn create_room() -> (StatusCode, Json<NewRoomResponse>) {
    let room = Room::generate();
    tracing::info!(room = %room, "Room generated");

    (
        StatusCode::CREATED,
        Json(NewRoomResponse {
            page: page_path(&room),
            room: room.to_string(),
        }),
    )
}
