use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::account_service::{self, NewClient};
use crate::services::profile_service::{self, ClientSummary};
use crate::services::{asset_service, note_service, request_service};

/// GET /api/admin/clients - Client roster with request/asset counts
pub async fn list() -> ApiResult<Vec<ClientSummary>> {
    let clients = profile_service::list_clients().await?;
    Ok(ApiResponse::success(clients))
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    pub company: Option<String>,
}

/// POST /api/admin/clients - Provision a client account and profile
pub async fn create(
    Extension(admin): Extension<AuthUser>,
    Json(payload): Json<CreateClientRequest>,
) -> ApiResult<serde_json::Value> {
    let (account, profile) = account_service::create_client(NewClient {
        email: payload.email,
        password: payload.password,
        full_name: payload.full_name,
        company: payload.company,
    })
    .await?;

    tracing::info!("Client {} provisioned by {}", account.email, admin.email);

    Ok(ApiResponse::created(json!({
        "account": account,
        "profile": profile,
    })))
}

/// GET /api/admin/clients/:id - Client detail: profile, requests, assets, notes
pub async fn show(Path(id): Path<Uuid>) -> ApiResult<serde_json::Value> {
    let (account, profile) = profile_service::client_detail(id).await?;
    let requests = request_service::list_for_client(id).await?;
    let assets = asset_service::list_for_client(id).await?;
    let notes = note_service::list_for_client(id).await?;

    Ok(ApiResponse::success(json!({
        "account": account,
        "profile": profile,
        "requests": requests,
        "library": asset_service::into_library(assets),
        "notes": notes,
    })))
}
