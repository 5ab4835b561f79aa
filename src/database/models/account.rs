use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Portal account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == PortalRole::Admin.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalRole {
    Admin,
    Client,
}

impl PortalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortalRole::Admin => "admin",
            PortalRole::Client => "client",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(PortalRole::Admin),
            "client" => Some(PortalRole::Client),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_roundtrip() {
        assert_eq!(PortalRole::parse("admin"), Some(PortalRole::Admin));
        assert_eq!(PortalRole::parse("client"), Some(PortalRole::Client));
        assert_eq!(PortalRole::parse("superuser"), None);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let account = Account {
            id: Uuid::new_v4(),
            email: "client@example.com".into(),
            password_hash: "$argon2id$...".into(),
            role: "client".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "client@example.com");
    }
}
