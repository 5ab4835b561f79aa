use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::{account_service, profile_service};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate and receive a JWT
///
/// Expected Input:
/// ```json
/// {
///   "email": "client@example.com",
///   "password": "..."
/// }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": "...", "email": "...", "role": "client" },
///     "profile": { "account_id": "...", "full_name": "...", "company": null },
///     "expires_in": 3600
///   }
/// }
/// ```
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<serde_json::Value> {
    let account = account_service::authenticate(&payload.email, &payload.password).await?;

    // Synchronize the auth identity into the application profile
    let profile = profile_service::fetch_or_create(account.id).await?;

    let claims = Claims::new(account.id, account.email.clone(), account.role.clone());
    let expires_in = claims.expires_in();
    let token = generate_jwt(&claims)?;

    tracing::info!("Login: {} ({})", account.email, account.role);

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": account.id,
            "email": account.email,
            "role": account.role,
        },
        "profile": profile,
        "expires_in": expires_in,
    })))
}
