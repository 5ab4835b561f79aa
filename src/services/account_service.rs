use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::account::{Account, PortalRole};
use crate::database::models::profile::Profile;
use crate::services::ServiceError;

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Validate login credentials against the accounts table.
///
/// Unknown email, wrong password, and deactivated account all collapse into
/// InvalidCredentials so the response does not leak which one it was.
pub async fn authenticate(email: &str, password: &str) -> Result<Account, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, password_hash, role, is_active, created_at, updated_at
         FROM accounts
         WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(&pool)
    .await?;

    let account = account.ok_or(ServiceError::InvalidCredentials)?;

    if !account.is_active || !verify_password(password, &account.password_hash)? {
        return Err(ServiceError::InvalidCredentials);
    }

    Ok(account)
}

pub async fn find_account(account_id: Uuid) -> Result<Option<Account>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, password_hash, role, is_active, created_at, updated_at
         FROM accounts
         WHERE id = $1",
    )
    .bind(account_id)
    .fetch_optional(&pool)
    .await?;

    Ok(account)
}

pub struct NewClient {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company: Option<String>,
}

/// Provision a client account with its profile row.
pub async fn create_client(new_client: NewClient) -> Result<(Account, Profile), ServiceError> {
    let email = new_client.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::Validation("A valid email is required".to_string()));
    }
    if new_client.password.len() < 8 {
        return Err(ServiceError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let pool = DatabaseManager::pool().await?;

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!(
            "An account already exists for {}",
            email
        )));
    }

    let password_hash = hash_password(&new_client.password)?;
    let account_id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    let account = sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (id, email, password_hash, role, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, TRUE, $5, $5)
         RETURNING id, email, password_hash, role, is_active, created_at, updated_at",
    )
    .bind(account_id)
    .bind(&email)
    .bind(&password_hash)
    .bind(PortalRole::Client.as_str())
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let profile = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (account_id, full_name, company, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING account_id, full_name, company, created_at, updated_at",
    )
    .bind(account_id)
    .bind(new_client.full_name.trim())
    .bind(new_client.company.as_deref().map(str::trim))
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((account, profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same input").unwrap();
        let b = hash_password("same input").unwrap();
        assert_ne!(a, b);
    }
}
