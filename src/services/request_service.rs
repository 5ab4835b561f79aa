use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::request::{DesignRequest, RequestKind, RequestStatus};
use crate::middleware::AuthUser;
use crate::services::ServiceError;

pub struct NewRequest {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub details: Value,
}

/// Insert a new brief owned by the caller. New requests always land in the
/// first board column.
pub async fn submit(client_id: Uuid, new_request: NewRequest) -> Result<DesignRequest, ServiceError> {
    let kind = RequestKind::parse(&new_request.kind).ok_or_else(|| {
        ServiceError::Validation(format!(
            "Unknown request kind '{}', expected one of: brand, website, product",
            new_request.kind
        ))
    })?;

    let title = new_request.title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation("Title is required".to_string()));
    }

    if !new_request.details.is_object() {
        return Err(ServiceError::Validation(
            "Brief details must be a JSON object".to_string(),
        ));
    }

    let pool = DatabaseManager::pool().await?;
    let request = sqlx::query_as::<_, DesignRequest>(
        "INSERT INTO requests (id, client_id, kind, title, description, details, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, client_id, kind, title, description, details, status, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(client_id)
    .bind(kind.as_str())
    .bind(title)
    .bind(new_request.description.trim())
    .bind(&new_request.details)
    .bind(RequestStatus::New.as_str())
    .fetch_one(&pool)
    .await?;

    Ok(request)
}

/// Requests visible to the caller: admins see every client's, clients see
/// their own.
pub async fn list_for(user: &AuthUser) -> Result<Vec<DesignRequest>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let requests = if user.is_admin() {
        sqlx::query_as::<_, DesignRequest>(
            "SELECT id, client_id, kind, title, description, details, status, created_at, updated_at
             FROM requests
             ORDER BY created_at DESC",
        )
        .fetch_all(&pool)
        .await?
    } else {
        sqlx::query_as::<_, DesignRequest>(
            "SELECT id, client_id, kind, title, description, details, status, created_at, updated_at
             FROM requests
             WHERE client_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user.account_id)
        .fetch_all(&pool)
        .await?
    };

    Ok(requests)
}

pub async fn list_for_client(client_id: Uuid) -> Result<Vec<DesignRequest>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let requests = sqlx::query_as::<_, DesignRequest>(
        "SELECT id, client_id, kind, title, description, details, status, created_at, updated_at
         FROM requests
         WHERE client_id = $1
         ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(&pool)
    .await?;

    Ok(requests)
}

/// Fetch one request with owner-or-admin scoping. A request belonging to
/// someone else reads as not-found rather than forbidden.
pub async fn get_scoped(user: &AuthUser, request_id: Uuid) -> Result<DesignRequest, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let request = sqlx::query_as::<_, DesignRequest>(
        "SELECT id, client_id, kind, title, description, details, status, created_at, updated_at
         FROM requests
         WHERE id = $1",
    )
    .bind(request_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("No request with id {}", request_id)))?;

    if !user.is_admin() && request.client_id != user.account_id {
        return Err(ServiceError::NotFound(format!(
            "No request with id {}",
            request_id
        )));
    }

    Ok(request)
}

/// Move a request to another board column.
pub async fn set_status(request_id: Uuid, status: &str) -> Result<DesignRequest, ServiceError> {
    let status = RequestStatus::parse(status).ok_or_else(|| {
        ServiceError::Validation(format!(
            "Unknown status '{}', expected one of: new, in_progress, review, done",
            status
        ))
    })?;

    let pool = DatabaseManager::pool().await?;
    let request = sqlx::query_as::<_, DesignRequest>(
        "UPDATE requests
         SET status = $2, updated_at = now()
         WHERE id = $1
         RETURNING id, client_id, kind, title, description, details, status, created_at, updated_at",
    )
    .bind(request_id)
    .bind(status.as_str())
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("No request with id {}", request_id)))?;

    Ok(request)
}

#[derive(Debug, Serialize)]
pub struct BoardColumn {
    pub status: &'static str,
    pub title: &'static str,
    pub requests: Vec<DesignRequest>,
}

/// Kanban view: every request grouped into the fixed column order.
pub async fn board() -> Result<Vec<BoardColumn>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let all = sqlx::query_as::<_, DesignRequest>(
        "SELECT id, client_id, kind, title, description, details, status, created_at, updated_at
         FROM requests
         ORDER BY updated_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    let mut columns: Vec<BoardColumn> = RequestStatus::ALL
        .iter()
        .map(|status| BoardColumn {
            status: status.as_str(),
            title: status.display_name(),
            requests: Vec::new(),
        })
        .collect();

    for request in all {
        // Rows with an unexpected status land in the first column rather
        // than disappearing from the board
        let idx = RequestStatus::parse(&request.status)
            .and_then(|s| RequestStatus::ALL.iter().position(|c| *c == s))
            .unwrap_or(0);
        columns[idx].requests.push(request);
    }

    Ok(columns)
}
