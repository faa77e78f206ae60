use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::platform::Platform;

/// One saved URL plus its organizational and enrichment metadata. Row shape
/// of the `saved_links` table; enrichment fields start NULL and are filled
/// asynchronously after the save.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    pub platform: Platform,
    pub thumbnail: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub ai_tags: Vec<String>,
    pub og_image: Option<String>,
    pub og_description: Option<String>,
    pub favicon: Option<String>,
    pub summary: Option<String>,
    pub collection_id: Option<Uuid>,
    pub is_highlighted: bool,
    pub reminder_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ephemeral result of one enrichment pass. Only non-empty fields are
/// serialized and only non-empty fields are written back to the row.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_tags: Option<Vec<String>>,
}

impl EnrichmentResult {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.og_image.is_none()
            && self.og_description.is_none()
            && self.favicon.is_none()
            && self.summary.is_none()
            && self.ai_tags.is_none()
    }
}
