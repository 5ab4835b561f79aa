use axum::{Extension, Json};
use serde::{Deserialize, Deserializer};

use crate::database::models::profile::Profile;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::profile_service::{self, ProfileChanges};

/// GET /api/profile - Own profile (created on first access)
pub async fn show(Extension(user): Extension<AuthUser>) -> ApiResult<Profile> {
    let profile = profile_service::fetch_or_create(user.account_id).await?;
    Ok(ApiResponse::success(profile))
}

/// Distinguishes an absent field (no change) from an explicit null (clear).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
}

/// PUT /api/profile - Update own profile
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Profile> {
    let profile = profile_service::update_profile(
        user.account_id,
        ProfileChanges {
            full_name: payload.full_name,
            company: payload.company,
        },
    )
    .await?;

    Ok(ApiResponse::success(profile))
}
