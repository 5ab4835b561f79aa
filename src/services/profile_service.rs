use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::account::{Account, PortalRole};
use crate::database::models::profile::Profile;
use crate::services::ServiceError;

/// Fetch the profile for an account, creating an empty one if the account
/// has never had its identity synchronized. Called on login and on every
/// successful session refresh.
pub async fn fetch_or_create(account_id: Uuid) -> Result<Profile, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    sqlx::query(
        "INSERT INTO profiles (account_id, full_name)
         VALUES ($1, '')
         ON CONFLICT (account_id) DO NOTHING",
    )
    .bind(account_id)
    .execute(&pool)
    .await?;

    let profile = sqlx::query_as::<_, Profile>(
        "SELECT account_id, full_name, company, created_at, updated_at
         FROM profiles
         WHERE account_id = $1",
    )
    .bind(account_id)
    .fetch_one(&pool)
    .await?;

    Ok(profile)
}

pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub company: Option<Option<String>>,
}

pub async fn update_profile(
    account_id: Uuid,
    changes: ProfileChanges,
) -> Result<Profile, ServiceError> {
    // Ensure the row exists before patching it
    let current = fetch_or_create(account_id).await?;

    let full_name = changes.full_name.unwrap_or(current.full_name);
    let company = changes.company.unwrap_or(current.company);

    let pool = DatabaseManager::pool().await?;
    let profile = sqlx::query_as::<_, Profile>(
        "UPDATE profiles
         SET full_name = $2, company = $3, updated_at = now()
         WHERE account_id = $1
         RETURNING account_id, full_name, company, created_at, updated_at",
    )
    .bind(account_id)
    .bind(full_name.trim())
    .bind(company.as_deref().map(str::trim))
    .fetch_one(&pool)
    .await?;

    Ok(profile)
}

/// Roster row for the admin dashboard.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClientSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub company: Option<String>,
    pub request_count: i64,
    pub asset_count: i64,
    pub created_at: DateTime<Utc>,
}

pub async fn list_clients() -> Result<Vec<ClientSummary>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let clients = sqlx::query_as::<_, ClientSummary>(
        "SELECT a.id,
                a.email,
                COALESCE(p.full_name, '') AS full_name,
                p.company,
                (SELECT COUNT(*) FROM requests r WHERE r.client_id = a.id) AS request_count,
                (SELECT COUNT(*) FROM assets s WHERE s.client_id = a.id) AS asset_count,
                a.created_at
         FROM accounts a
         LEFT JOIN profiles p ON p.account_id = a.id
         WHERE a.role = $1 AND a.is_active
         ORDER BY a.created_at DESC",
    )
    .bind(PortalRole::Client.as_str())
    .fetch_all(&pool)
    .await?;

    Ok(clients)
}

/// Account + profile pair for the admin client-detail view.
pub async fn client_detail(client_id: Uuid) -> Result<(Account, Profile), ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, password_hash, role, is_active, created_at, updated_at
         FROM accounts
         WHERE id = $1 AND role = $2",
    )
    .bind(client_id)
    .bind(PortalRole::Client.as_str())
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("No client with id {}", client_id)))?;

    let profile = fetch_or_create(client_id).await?;

    Ok((account, profile))
}
