use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::asset::{Asset, AssetCategory, AssetView};
use crate::middleware::AuthUser;
use crate::services::ServiceError;
use crate::storage::ObjectStorage;

const ASSET_COLUMNS: &str = "id, client_id, label, description, category, object_key, \
                             content_type, size_bytes, checksum, uploaded_by, created_at";

pub struct UploadAsset {
    pub client_id: Uuid,
    pub label: String,
    pub description: Option<String>,
    /// Explicit category override; None means derive from the label.
    pub category: Option<String>,
    pub content_type: String,
    /// Base64-encoded file content.
    pub data: String,
}

fn checksum_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Store the bytes and insert the metadata row. If the insert fails the
/// stored object is removed again so the store does not accumulate orphans.
pub async fn upload(uploader: &AuthUser, upload: UploadAsset) -> Result<Asset, ServiceError> {
    let label = upload.label.trim().to_string();
    if label.is_empty() {
        return Err(ServiceError::Validation("Label is required".to_string()));
    }

    if let Some(category) = upload.category.as_deref() {
        if AssetCategory::parse(category).is_none() {
            return Err(ServiceError::Validation(format!(
                "Unknown category '{}'",
                category
            )));
        }
    }

    let bytes = BASE64
        .decode(upload.data.as_bytes())
        .map_err(|e| ServiceError::Validation(format!("Invalid base64 payload: {}", e)))?;
    if bytes.is_empty() {
        return Err(ServiceError::Validation("Asset content is empty".to_string()));
    }
    let max = config::config().api.max_asset_size_bytes;
    if bytes.len() > max {
        return Err(ServiceError::Validation(format!(
            "Asset exceeds the {} byte limit",
            max
        )));
    }

    let asset_id = Uuid::new_v4();
    let object_key = ObjectStorage::asset_key(upload.client_id, asset_id);
    let checksum = checksum_hex(&bytes);

    let storage = ObjectStorage::from_config();
    storage.save(&object_key, &bytes).await?;

    let pool = match DatabaseManager::pool().await {
        Ok(pool) => pool,
        Err(e) => {
            cleanup_object(&storage, &object_key).await;
            return Err(e.into());
        }
    };

    let inserted = sqlx::query_as::<_, Asset>(&format!(
        "INSERT INTO assets (id, client_id, label, description, category, object_key, \
                             content_type, size_bytes, checksum, uploaded_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {ASSET_COLUMNS}"
    ))
    .bind(asset_id)
    .bind(upload.client_id)
    .bind(&label)
    .bind(upload.description.as_deref().map(str::trim))
    .bind(upload.category.as_deref())
    .bind(&object_key)
    .bind(upload.content_type.trim())
    .bind(bytes.len() as i64)
    .bind(&checksum)
    .bind(uploader.account_id)
    .fetch_one(&pool)
    .await;

    match inserted {
        Ok(asset) => Ok(asset),
        Err(e) => {
            cleanup_object(&storage, &object_key).await;
            Err(e.into())
        }
    }
}

async fn cleanup_object(storage: &ObjectStorage, key: &str) {
    if let Err(e) = storage.delete(key).await {
        warn!("Failed to remove orphaned object {}: {}", key, e);
    }
}

/// Assets visible to the caller, newest first.
pub async fn list_for(user: &AuthUser) -> Result<Vec<Asset>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let assets = if user.is_admin() {
        sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets ORDER BY created_at DESC"
        ))
        .fetch_all(&pool)
        .await?
    } else {
        sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE client_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.account_id)
        .fetch_all(&pool)
        .await?
    };

    Ok(assets)
}

pub async fn list_for_client(client_id: Uuid) -> Result<Vec<Asset>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let assets = sqlx::query_as::<_, Asset>(&format!(
        "SELECT {ASSET_COLUMNS} FROM assets WHERE client_id = $1 ORDER BY created_at DESC"
    ))
    .bind(client_id)
    .fetch_all(&pool)
    .await?;

    Ok(assets)
}

#[derive(Debug, Serialize)]
pub struct LibraryShelf {
    pub category: &'static str,
    pub title: &'static str,
    pub assets: Vec<AssetView>,
}

/// The categorized library view. Empty shelves are omitted.
pub fn into_library(assets: Vec<Asset>) -> Vec<LibraryShelf> {
    AssetCategory::ALL
        .iter()
        .filter_map(|category| {
            let shelf: Vec<AssetView> = assets
                .iter()
                .filter(|a| a.effective_category() == *category)
                .map(Asset::to_view)
                .collect();
            if shelf.is_empty() {
                None
            } else {
                Some(LibraryShelf {
                    category: category.as_str(),
                    title: category.display_name(),
                    assets: shelf,
                })
            }
        })
        .collect()
}

/// Fetch one asset with owner-or-admin scoping.
pub async fn get_scoped(user: &AuthUser, asset_id: Uuid) -> Result<Asset, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let asset = sqlx::query_as::<_, Asset>(&format!(
        "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1"
    ))
    .bind(asset_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("No asset with id {}", asset_id)))?;

    if !user.is_admin() && asset.client_id != user.account_id {
        return Err(ServiceError::NotFound(format!("No asset with id {}", asset_id)));
    }

    Ok(asset)
}

/// Read the object bytes for an asset, verifying them against the stored
/// checksum before serving.
pub async fn download(user: &AuthUser, asset_id: Uuid) -> Result<(Asset, Vec<u8>), ServiceError> {
    let asset = get_scoped(user, asset_id).await?;

    let storage = ObjectStorage::from_config();
    let bytes = storage.read(&asset.object_key).await?;

    if checksum_hex(&bytes) != asset.checksum {
        warn!("Checksum mismatch for asset {}", asset.id);
        return Err(ServiceError::Validation(
            "Stored asset failed integrity verification".to_string(),
        ));
    }

    Ok((asset, bytes))
}

pub struct AssetChanges {
    pub label: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
}

/// Patch asset metadata. Setting category to null returns the asset to
/// keyword-derived categorization.
pub async fn update_metadata(asset_id: Uuid, changes: AssetChanges) -> Result<Asset, ServiceError> {
    if let Some(Some(category)) = changes.category.as_ref() {
        if AssetCategory::parse(category).is_none() {
            return Err(ServiceError::Validation(format!(
                "Unknown category '{}'",
                category
            )));
        }
    }
    if let Some(label) = changes.label.as_deref() {
        if label.trim().is_empty() {
            return Err(ServiceError::Validation("Label cannot be empty".to_string()));
        }
    }

    let pool = DatabaseManager::pool().await?;

    let current = sqlx::query_as::<_, Asset>(&format!(
        "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1"
    ))
    .bind(asset_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("No asset with id {}", asset_id)))?;

    let label = changes
        .label
        .map(|l| l.trim().to_string())
        .unwrap_or(current.label);
    let description = changes.description.unwrap_or(current.description);
    let category = changes.category.unwrap_or(current.category);

    let asset = sqlx::query_as::<_, Asset>(&format!(
        "UPDATE assets
         SET label = $2, description = $3, category = $4
         WHERE id = $1
         RETURNING {ASSET_COLUMNS}"
    ))
    .bind(asset_id)
    .bind(&label)
    .bind(description.as_deref())
    .bind(category.as_deref())
    .fetch_one(&pool)
    .await?;

    Ok(asset)
}

/// Remove the metadata row and the stored object. A missing object is only
/// logged: the row is gone either way.
pub async fn delete(asset_id: Uuid) -> Result<(), ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let deleted = sqlx::query_as::<_, Asset>(&format!(
        "DELETE FROM assets WHERE id = $1 RETURNING {ASSET_COLUMNS}"
    ))
    .bind(asset_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("No asset with id {}", asset_id)))?;

    let storage = ObjectStorage::from_config();
    if let Err(e) = storage.delete(&deleted.object_key).await {
        warn!("Asset {} deleted but object removal failed: {}", asset_id, e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn asset(label: &str, category: Option<&str>) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            label: label.to_string(),
            description: None,
            category: category.map(str::to_string),
            object_key: "assets/a/b".into(),
            content_type: "image/png".into(),
            size_bytes: 1,
            checksum: "x".into(),
            uploaded_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn library_groups_by_effective_category() {
        let shelves = into_library(vec![
            asset("Primary logo", None),
            asset("Secondary logo", None),
            asset("Landing page", None),
            asset("Misc file", Some("social")),
        ]);

        let categories: Vec<&str> = shelves.iter().map(|s| s.category).collect();
        assert_eq!(categories, vec!["logo", "website", "social"]);
        assert_eq!(shelves[0].assets.len(), 2);
    }

    #[test]
    fn library_omits_empty_shelves() {
        let shelves = into_library(vec![]);
        assert!(shelves.is_empty());
    }

    #[test]
    fn checksum_is_stable_hex() {
        let a = checksum_hex(b"bytes");
        let b = checksum_hex(b"bytes");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
