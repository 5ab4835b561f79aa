use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A creative-request brief submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DesignRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub details: Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What kind of work the brief asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Brand,
    Website,
    Product,
}

impl RequestKind {
    pub const ALL: [RequestKind; 3] = [RequestKind::Brand, RequestKind::Website, RequestKind::Product];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Brand => "brand",
            RequestKind::Website => "website",
            RequestKind::Product => "product",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "brand" => Some(RequestKind::Brand),
            "website" => Some(RequestKind::Website),
            "product" => Some(RequestKind::Product),
            _ => None,
        }
    }
}

/// Kanban column for a request. Admins move requests between columns; there
/// is no transition graph beyond "any valid status to any valid status".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    New,
    InProgress,
    Review,
    Done,
}

impl RequestStatus {
    /// Board column order.
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::New,
        RequestStatus::InProgress,
        RequestStatus::Review,
        RequestStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Review => "review",
            RequestStatus::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(RequestStatus::New),
            "in_progress" => Some(RequestStatus::InProgress),
            "review" => Some(RequestStatus::Review),
            "done" => Some(RequestStatus::Done),
            _ => None,
        }
    }

    /// Human-readable column title.
    pub fn display_name(&self) -> &'static str {
        match self {
            RequestStatus::New => "New",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Review => "In Review",
            RequestStatus::Done => "Done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_every_column() {
        for status in RequestStatus::ALL {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::parse("archived"), None);
    }

    #[test]
    fn kind_parse_accepts_every_kind() {
        for kind in RequestKind::ALL {
            assert_eq!(RequestKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RequestKind::parse("video"), None);
    }
}
