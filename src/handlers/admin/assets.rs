use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::asset::Asset;
use crate::handlers::protected::profile::double_option;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::asset_service::{self, AssetChanges, UploadAsset};

#[derive(Debug, Deserialize)]
pub struct UploadAssetRequest {
    pub client_id: Uuid,
    pub label: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub content_type: String,
    /// Base64-encoded file content.
    pub data: String,
}

/// POST /api/admin/assets - Upload a delivered asset for a client
pub async fn upload(
    Extension(admin): Extension<AuthUser>,
    Json(payload): Json<UploadAssetRequest>,
) -> ApiResult<Asset> {
    let asset = asset_service::upload(
        &admin,
        UploadAsset {
            client_id: payload.client_id,
            label: payload.label,
            description: payload.description,
            category: payload.category,
            content_type: payload.content_type,
            data: payload.data,
        },
    )
    .await?;

    tracing::info!(
        "Asset {} ({} bytes) uploaded for client {}",
        asset.id,
        asset.size_bytes,
        asset.client_id
    );

    Ok(ApiResponse::created(asset))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssetRequest {
    pub label: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Explicit null clears the override and returns the asset to
    /// keyword-derived categorization.
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

/// PATCH /api/admin/assets/:id - Update asset metadata
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssetRequest>,
) -> ApiResult<Asset> {
    let asset = asset_service::update_metadata(
        id,
        AssetChanges {
            label: payload.label,
            description: payload.description,
            category: payload.category,
        },
    )
    .await?;

    Ok(ApiResponse::success(asset))
}

/// DELETE /api/admin/assets/:id - Remove an asset and its stored object
pub async fn remove(Path(id): Path<Uuid>) -> ApiResult<()> {
    asset_service::delete(id).await?;
    Ok(ApiResponse::no_content())
}
