//! Entry Routes
//!
//! - GET /api/v1/rooms/:room/entries - Latest entry and history
//! - POST /api/v1/rooms/:room/entries - Submit text
//! - DELETE /api/v1/rooms/:room/entries - Clear all entries

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{SubmitRequest, SubmitResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::clipboard::{ClipboardView, RequestContext, SubmitOutcome};
use crate::storage::Room;
use crate::websocket::WsEvent;

/// GET /api/v1/rooms/:room/entries
pub async fn get_entries(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Json<ClipboardView>> {
    let ctx = RequestContext::new(parse_room(&room)?);
    let view = state.clipboard.view(&ctx).await?;
    Ok(Json(view))
}

/// POST /api/v1/rooms/:room/entries
///
/// 201 when the text was stored, 200 when blank text was ignored.
pub async fn submit_entry(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let ctx = RequestContext::new(parse_room(&room)?);

    match submit(&state, &ctx, &req.text).await? {
        SubmitOutcome::Appended(entries) => Ok((
            StatusCode::CREATED,
            Json(SubmitResponse {
                status: "ok".to_string(),
                entries,
            }),
        )),
        SubmitOutcome::Ignored(entries) => Ok((
            StatusCode::OK,
            Json(SubmitResponse {
                status: "ignored".to_string(),
                entries,
            }),
        )),
    }
}

/// DELETE /api/v1/rooms/:room/entries
pub async fn clear_entries(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<StatusCode> {
    let ctx = RequestContext::new(parse_room(&room)?);
    clear(&state, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit text and notify the room's subscribers on change
pub(crate) async fn submit(
    state: &AppState,
    ctx: &RequestContext,
    text: &str,
) -> ApiResult<SubmitOutcome> {
    let outcome = state.clipboard.submit(ctx, text).await?;

    if let SubmitOutcome::Appended(entries) = &outcome {
        state
            .ws_hub
            .publish(WsEvent::entries_updated(&ctx.room, entries))
            .await;
    }

    Ok(outcome)
}

/// Clear a room and notify its subscribers
pub(crate) async fn clear(state: &AppState, ctx: &RequestContext) -> ApiResult<()> {
    state.clipboard.clear(ctx).await?;
    state
        .ws_hub
        .publish(WsEvent::entries_updated(&ctx.room, &[]))
        .await;
    Ok(())
}

/// Parse a room path segment
pub(crate) fn parse_room(room: &str) -> ApiResult<Room> {
    Ok(room.parse()?)
}
