use axum::Extension;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::{account_service, profile_service};

/// GET /api/auth/whoami - Current user and profile
///
/// This is the endpoint behind the client's background session refresh: the
/// refresh coordinator calls it to revalidate the session, and the returned
/// profile is the "fetch and upsert" half of the refresh.
///
/// Returns 401 when the account no longer exists or has been deactivated;
/// for a client holding a token this is the authoritative expiry signal.
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<serde_json::Value> {
    let account = account_service::find_account(user.account_id)
        .await?
        .filter(|a| a.is_active)
        .ok_or_else(|| ApiError::unauthorized("Account is no longer active"))?;

    let profile = profile_service::fetch_or_create(account.id).await?;

    Ok(ApiResponse::success(json!({
        "user": {
            "id": account.id,
            "email": account.email,
            "role": account.role,
        },
        "profile": profile,
    })))
}
