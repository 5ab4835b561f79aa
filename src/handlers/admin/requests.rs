use axum::extract::Path;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::request::DesignRequest;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::request_service::{self, BoardColumn};

/// GET /api/admin/requests/board - Kanban view of all requests
pub async fn board() -> ApiResult<Vec<BoardColumn>> {
    let columns = request_service::board().await?;
    Ok(ApiResponse::success(columns))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// PUT /api/admin/requests/:id/status - Move a request to another column
pub async fn set_status(
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> ApiResult<DesignRequest> {
    let request = request_service::set_status(id, &payload.status).await?;
    tracing::info!("Request {} moved to {}", request.id, request.status);
    Ok(ApiResponse::success(request))
}
