use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Private admin note attached to a client. Never visible to the client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientNote {
    pub id: Uuid,
    pub client_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
