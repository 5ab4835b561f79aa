use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::request::DesignRequest;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::request_service::{self, NewRequest};

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Structured brief fields, specific to the request kind.
    #[serde(default = "empty_details")]
    pub details: Value,
}

fn empty_details() -> Value {
    Value::Object(Default::default())
}

/// POST /api/requests - Submit a creative-request brief
pub async fn submit(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SubmitRequest>,
) -> ApiResult<DesignRequest> {
    let request = request_service::submit(
        user.account_id,
        NewRequest {
            kind: payload.kind,
            title: payload.title,
            description: payload.description,
            details: payload.details,
        },
    )
    .await?;

    tracing::info!("Request {} submitted by {}", request.id, user.email);

    Ok(ApiResponse::created(request))
}

/// GET /api/requests - Own requests (all requests for admins)
pub async fn list(Extension(user): Extension<AuthUser>) -> ApiResult<Vec<DesignRequest>> {
    let requests = request_service::list_for(&user).await?;
    Ok(ApiResponse::success(requests))
}

/// GET /api/requests/:id - Single request, owner-or-admin scoped
pub async fn show(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<DesignRequest> {
    let request = request_service::get_scoped(&user, id).await?;
    Ok(ApiResponse::success(request))
}
