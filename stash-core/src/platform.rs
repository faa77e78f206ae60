use serde::{Deserialize, Serialize};

/// Source platform of a saved link, stored as the `platform_type` enum in
/// Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "platform_type", rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Youtube,
    Twitter,
    Shopping,
    Article,
    Other,
}

impl Platform {
    /// Best-effort detection from the URL host. `Other` is never detected;
    /// it exists only as an explicit user choice.
    pub fn detect(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("instagram.com") {
            Self::Instagram
        } else if lower.contains("youtube.com") || lower.contains("youtu.be") {
            Self::Youtube
        } else if lower.contains("twitter.com") || lower.contains("x.com") {
            Self::Twitter
        } else if lower.contains("amazon.") || lower.contains("ebay.") || lower.contains("etsy.") {
            Self::Shopping
        } else {
            Self::Article
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Twitter => "twitter",
            Self::Shopping => "shopping",
            Self::Article => "article",
            Self::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_known_hosts() {
        assert_eq!(
            Platform::detect("https://www.instagram.com/p/abc"),
            Platform::Instagram
        );
        assert_eq!(
            Platform::detect("https://youtu.be/dQw4w9WgXcQ"),
            Platform::Youtube
        );
        assert_eq!(
            Platform::detect("https://x.com/rustlang/status/1"),
            Platform::Twitter
        );
        assert_eq!(
            Platform::detect("https://www.amazon.de/dp/B000"),
            Platform::Shopping
        );
    }

    #[test]
    fn test_unknown_hosts_are_articles() {
        assert_eq!(
            Platform::detect("https://blog.example.com/post"),
            Platform::Article
        );
    }
}
