use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::note::ClientNote;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::note_service;

/// GET /api/admin/clients/:id/notes - Private notes for a client
pub async fn list(Path(client_id): Path<Uuid>) -> ApiResult<Vec<ClientNote>> {
    let notes = note_service::list_for_client(client_id).await?;
    Ok(ApiResponse::success(notes))
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub body: String,
}

/// POST /api/admin/clients/:id/notes - Add a private note
pub async fn create(
    Extension(admin): Extension<AuthUser>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<CreateNoteRequest>,
) -> ApiResult<ClientNote> {
    let note = note_service::add(client_id, admin.account_id, &payload.body).await?;
    Ok(ApiResponse::created(note))
}

/// DELETE /api/admin/notes/:id - Remove a note
pub async fn remove(Path(id): Path<Uuid>) -> ApiResult<()> {
    note_service::delete(id).await?;
    Ok(ApiResponse::no_content())
}
