use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata row for a delivered asset. The bytes live in the object store
/// under `object_key`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub client_id: Uuid,
    pub label: String,
    pub description: Option<String>,
    /// Explicit category set by an admin; when None the category is derived
    /// from the label keywords.
    pub category: Option<String>,
    pub object_key: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// The category shown in the library: an admin override wins, otherwise
    /// the label keywords decide.
    pub fn effective_category(&self) -> AssetCategory {
        self.category
            .as_deref()
            .and_then(AssetCategory::parse)
            .unwrap_or_else(|| AssetCategory::from_label(&self.label))
    }

    /// Client-facing view with the resolved category and without internal
    /// storage fields.
    pub fn to_view(&self) -> AssetView {
        AssetView {
            id: self.id,
            client_id: self.client_id,
            label: self.label.clone(),
            description: self.description.clone(),
            category: self.effective_category().as_str().to_string(),
            content_type: self.content_type.clone(),
            size_bytes: self.size_bytes,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetView {
    pub id: Uuid,
    pub client_id: Uuid,
    pub label: String,
    pub description: Option<String>,
    pub category: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Library shelf an asset is displayed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    Logo,
    Brand,
    Website,
    Product,
    Social,
    Other,
}

impl AssetCategory {
    /// Display order in the library.
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::Logo,
        AssetCategory::Brand,
        AssetCategory::Website,
        AssetCategory::Product,
        AssetCategory::Social,
        AssetCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Logo => "logo",
            AssetCategory::Brand => "brand",
            AssetCategory::Website => "website",
            AssetCategory::Product => "product",
            AssetCategory::Social => "social",
            AssetCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "logo" => Some(AssetCategory::Logo),
            "brand" => Some(AssetCategory::Brand),
            "website" => Some(AssetCategory::Website),
            "product" => Some(AssetCategory::Product),
            "social" => Some(AssetCategory::Social),
            "other" => Some(AssetCategory::Other),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssetCategory::Logo => "Brand Logos",
            AssetCategory::Brand => "Brand Guidelines",
            AssetCategory::Website => "Website Design",
            AssetCategory::Product => "Product Design",
            AssetCategory::Social => "Social Media",
            AssetCategory::Other => "Other",
        }
    }

    /// Keyword match against a free-text label. "logo" wins over "brand" so
    /// a "brand logo pack" lands on the logo shelf.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|n| label.contains(n));

        if label.contains("logo") {
            AssetCategory::Logo
        } else if contains_any(&["brand", "guideline", "identity"]) {
            AssetCategory::Brand
        } else if contains_any(&["web", "site", "landing"]) {
            AssetCategory::Website
        } else if contains_any(&["product", "packaging", "mockup"]) {
            AssetCategory::Product
        } else if contains_any(&["social", "instagram", "facebook", "banner"]) {
            AssetCategory::Social
        } else {
            AssetCategory::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_keywords_map_to_categories() {
        assert_eq!(AssetCategory::from_label("Primary Logo (dark)"), AssetCategory::Logo);
        assert_eq!(AssetCategory::from_label("Brand guidelines v2"), AssetCategory::Brand);
        assert_eq!(AssetCategory::from_label("Landing page hero"), AssetCategory::Website);
        assert_eq!(AssetCategory::from_label("Packaging mockup"), AssetCategory::Product);
        assert_eq!(AssetCategory::from_label("Instagram story set"), AssetCategory::Social);
        assert_eq!(AssetCategory::from_label("Q3 invoice"), AssetCategory::Other);
    }

    #[test]
    fn logo_wins_over_brand() {
        assert_eq!(AssetCategory::from_label("Brand logo pack"), AssetCategory::Logo);
    }

    #[test]
    fn explicit_category_overrides_label() {
        let asset = Asset {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            label: "Primary logo".into(),
            description: None,
            category: Some("social".into()),
            object_key: "assets/x/y".into(),
            content_type: "image/png".into(),
            size_bytes: 10,
            checksum: "abc".into(),
            uploaded_by: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert_eq!(asset.effective_category(), AssetCategory::Social);
    }

    #[test]
    fn unknown_override_falls_back_to_label() {
        let asset = Asset {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            label: "Primary logo".into(),
            description: None,
            category: Some("misc".into()),
            object_key: "assets/x/y".into(),
            content_type: "image/png".into(),
            size_bytes: 10,
            checksum: "abc".into(),
            uploaded_by: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert_eq!(asset.effective_category(), AssetCategory::Logo);
    }
}
