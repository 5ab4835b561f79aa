use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::note::ClientNote;
use crate::services::ServiceError;

pub async fn list_for_client(client_id: Uuid) -> Result<Vec<ClientNote>, ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let notes = sqlx::query_as::<_, ClientNote>(
        "SELECT id, client_id, author_id, body, created_at
         FROM client_notes
         WHERE client_id = $1
         ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(&pool)
    .await?;

    Ok(notes)
}

pub async fn add(client_id: Uuid, author_id: Uuid, body: &str) -> Result<ClientNote, ServiceError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ServiceError::Validation("Note body is required".to_string()));
    }

    let pool = DatabaseManager::pool().await?;
    let note = sqlx::query_as::<_, ClientNote>(
        "INSERT INTO client_notes (id, client_id, author_id, body)
         VALUES ($1, $2, $3, $4)
         RETURNING id, client_id, author_id, body, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(client_id)
    .bind(author_id)
    .bind(body)
    .fetch_one(&pool)
    .await?;

    Ok(note)
}

pub async fn delete(note_id: Uuid) -> Result<(), ServiceError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM client_notes WHERE id = $1")
        .bind(note_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound(format!("No note with id {}", note_id)));
    }

    Ok(())
}
