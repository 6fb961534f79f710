//! Page Routes
//!
//! Browser-facing HTML and plain form actions. Every action answers
//! `303 See Other` back to the room's page.
//!
//! - GET / - Default room page
//! - GET /r/:room - Room page
//! - GET /new-room - Redirect to a freshly generated room
//! - POST /r/:room/submit - Submit text (form)
//! - POST /r/:room/clear - Clear all entries
//! - POST /r/:room/files - Upload files (multipart)
//! - POST /r/:room/files/:name/delete - Delete one file
//! - POST /r/:room/clear-files - Delete every file

use axum::{
    extract::{Multipart, Path, State},
    response::{Html, Redirect},
    Form,
};
use std::sync::Arc;

use super::entries::{clear, parse_room, submit};
use super::files::{remove, remove_all, store_uploads};
use crate::api::dto::SubmitRequest;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::clipboard::RequestContext;
use crate::render::{page_path, render_page};
use crate::storage::Room;

/// GET /
pub async fn default_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    show(&state, Room::Default).await
}

/// GET /r/:room
pub async fn room_page(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Html<String>> {
    show(&state, parse_room(&room)?).await
}

/// GET /new-room
pub async fn new_room() -> Redirect {
    let room = Room::generate();
    tracing::info!(room = %room, "Room generated");
    Redirect::to(&page_path(&room))
}

/// POST /r/:room/submit
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    Form(req): Form<SubmitRequest>,
) -> ApiResult<Redirect> {
    let ctx = RequestContext::new(parse_room(&room)?);
    submit(&state, &ctx, &req.text).await?;
    Ok(back_to(&ctx.room))
}

/// POST /r/:room/clear
pub async fn clear_form(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Redirect> {
    let ctx = RequestContext::new(parse_room(&room)?);
    clear(&state, &ctx).await?;
    Ok(back_to(&ctx.room))
}

/// POST /r/:room/files
pub async fn upload_form(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    multipart: Multipart,
) -> ApiResult<Redirect> {
    let room = parse_room(&room)?;
    store_uploads(&state, multipart).await?;
    Ok(back_to(&room))
}

/// POST /r/:room/files/:name/delete
pub async fn delete_file_form(
    State(state): State<Arc<AppState>>,
    Path((room, name)): Path<(String, String)>,
) -> ApiResult<Redirect> {
    let room = parse_room(&room)?;
    remove(&state, &name).await?;
    Ok(back_to(&room))
}

/// POST /r/:room/clear-files
pub async fn delete_all_form(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Redirect> {
    let room = parse_room(&room)?;
    remove_all(&state).await?;
    Ok(back_to(&room))
}

async fn show(state: &AppState, room: Room) -> ApiResult<Html<String>> {
    let ctx = RequestContext::new(room);
    let view = state.clipboard.view(&ctx).await?;
    let files = state.shelf.list().await?;
    Ok(Html(render_page(&ctx.room, &view, &files, &state.page)))
}

fn back_to(room: &Room) -> Redirect {
    Redirect::to(&page_path(room))
}
