use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named grouping of saved links, optionally shared publicly via a slug.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub is_smart: bool,
    pub is_public: bool,
    pub share_slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Slug for a public collection: slugified name plus the first 8 hex chars
/// of the id.
pub fn share_slug(name: &str, id: Uuid) -> String {
    let mut slug = String::new();
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let short = &id.simple().to_string()[..8];
    if slug.is_empty() {
        short.to_string()
    } else {
        format!("{slug}-{short}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_slug_shape() {
        let id = Uuid::new_v4();
        let slug = share_slug("Weekend  Reads!", id);
        let short = &id.simple().to_string()[..8];
        assert_eq!(slug, format!("weekend-reads-{short}"));
    }

    #[test]
    fn test_share_slug_empty_name() {
        let id = Uuid::new_v4();
        let slug = share_slug("!!!", id);
        assert_eq!(slug, id.simple().to_string()[..8].to_string());
    }
}
