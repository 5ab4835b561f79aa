use axum::extract::Path;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Extension;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::asset_service::{self, LibraryShelf};

/// GET /api/assets - The categorized asset library for the caller
pub async fn library(Extension(user): Extension<AuthUser>) -> ApiResult<Vec<LibraryShelf>> {
    let assets = asset_service::list_for(&user).await?;
    Ok(ApiResponse::success(asset_service::into_library(assets)))
}

/// GET /api/assets/:id/download - Raw asset bytes
pub async fn download(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (asset, bytes) = asset_service::download(&user, id).await?;

    // Label goes into the filename; strip anything that would break the header
    let filename: String = asset
        .label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();

    let headers = [
        (header::CONTENT_TYPE, asset.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, bytes))
}
