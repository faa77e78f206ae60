//! HTML metadata extraction for link enrichment
//!
//! Tolerant pattern matching over raw HTML rather than a strict DOM parse —
//! malformed markup is common on the open web and must never abort an
//! enrichment pass. Extracts the `<title>`, Open Graph image/description,
//! favicon, and a whitespace-collapsed plain-text rendering capped for the
//! downstream AI call.

use regex::Regex;
use reqwest::Url;

/// Extracted page metadata. Fields absent from the source HTML stay `None`;
/// they are never filled with placeholder text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub og_image: Option<String>,
    pub og_description: Option<String>,
    pub favicon: Option<String>,
    pub text: String,
}

/// Extract metadata from a fetched page. `page_url` is the URL the page was
/// fetched from, used to resolve relative favicon paths and the default
/// `/favicon.ico`. `max_content_chars` bounds the plain-text rendering.
pub fn extract_metadata(html: &str, page_url: &str, max_content_chars: usize) -> PageMetadata {
    let title = first_capture(html, r"(?is)<title[^>]*>(.*?)</title>");

    let og_image = meta_content(html, "property", "og:image");

    let og_description = meta_content(html, "property", "og:description")
        .or_else(|| meta_content(html, "name", "description"));

    let favicon = resolve_favicon(favicon_href(html).as_deref(), page_url);

    PageMetadata {
        title,
        og_image,
        og_description,
        favicon,
        text: truncate_chars(&strip_html(html), max_content_chars),
    }
}

/// First capture group of `pattern`, trimmed, `None` when empty or absent.
fn first_capture(html: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `<meta>` content for `attr="key"`, accepting both attribute orderings
/// (content-before-key and key-before-content).
fn meta_content(html: &str, attr: &str, key: &str) -> Option<String> {
    first_capture(
        html,
        &format!(r#"(?is)<meta[^>]*{attr}=["']{key}["'][^>]*content=["']([^"']+)["']"#),
    )
    .or_else(|| {
        first_capture(
            html,
            &format!(r#"(?is)<meta[^>]*content=["']([^"']+)["'][^>]*{attr}=["']{key}["']"#),
        )
    })
}

/// `<link rel="icon">` (or `shortcut icon`) href, both attribute orderings.
fn favicon_href(html: &str) -> Option<String> {
    first_capture(
        html,
        r#"(?is)<link[^>]*rel=["'](?:shortcut )?icon["'][^>]*href=["']([^"']+)["']"#,
    )
    .or_else(|| {
        first_capture(
            html,
            r#"(?is)<link[^>]*href=["']([^"']+)["'][^>]*rel=["'](?:shortcut )?icon["']"#,
        )
    })
}

/// Resolve a favicon href against the page origin. Absolute URLs pass
/// through; root-relative and bare-relative paths resolve against
/// `{scheme}://{host}`; no href at all defaults to `{origin}/favicon.ico`.
pub fn resolve_favicon(href: Option<&str>, page_url: &str) -> Option<String> {
    let origin = Url::parse(page_url).ok()?.origin().ascii_serialization();

    match href {
        Some(h) if h.starts_with('/') => Some(format!("{origin}{h}")),
        Some(h) if !h.starts_with("http") => Some(format!("{origin}/{h}")),
        Some(h) => Some(h.to_string()),
        None => Some(format!("{origin}/favicon.ico")),
    }
}

/// Strip `<script>`/`<style>` blocks and all remaining tags, then collapse
/// whitespace runs to single spaces.
pub fn strip_html(html: &str) -> String {
    let mut text = html.to_string();

    for pattern in [
        r"(?is)<script[^>]*>.*?</script>",
        r"(?is)<style[^>]*>.*?</style>",
        r"<[^>]+>",
    ] {
        if let Ok(re) = Regex::new(pattern) {
            text = re.replace_all(&text, " ").into_owned();
        }
    }

    if let Ok(re) = Regex::new(r"\s+") {
        text = re.replace_all(&text, " ").into_owned();
    }

    text.trim().to_string()
}

/// Truncate to at most `max_chars` characters, never splitting a multibyte
/// character.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 3000;

    #[test]
    fn test_title_extracted_and_trimmed() {
        let html = "<html><head><title>  Pasta  </title></head><body></body></html>";
        let meta = extract_metadata(html, "http://example.com/recipe", MAX);
        assert_eq!(meta.title.as_deref(), Some("Pasta"));
    }

    #[test]
    fn test_og_image_property_before_content() {
        let html = r#"<meta property="og:image" content="http://example.com/img.jpg">"#;
        let meta = extract_metadata(html, "http://example.com/", MAX);
        assert_eq!(meta.og_image.as_deref(), Some("http://example.com/img.jpg"));
    }

    #[test]
    fn test_og_image_content_before_property() {
        let html = r#"<meta content="http://example.com/img.jpg" property="og:image">"#;
        let meta = extract_metadata(html, "http://example.com/", MAX);
        assert_eq!(meta.og_image.as_deref(), Some("http://example.com/img.jpg"));
    }

    #[test]
    fn test_og_description_falls_back_to_standard_description() {
        let html = r#"<meta name="description" content="A plain description.">"#;
        let meta = extract_metadata(html, "http://example.com/", MAX);
        assert_eq!(meta.og_description.as_deref(), Some("A plain description."));

        let html = r#"
            <meta name="description" content="plain">
            <meta property="og:description" content="og wins">
        "#;
        let meta = extract_metadata(html, "http://example.com/", MAX);
        assert_eq!(meta.og_description.as_deref(), Some("og wins"));
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let meta = extract_metadata("<html><body>hi</body></html>", "http://example.com/", MAX);
        assert!(meta.title.is_none());
        assert!(meta.og_image.is_none());
        assert!(meta.og_description.is_none());
    }

    #[test]
    fn test_favicon_absolute_passthrough() {
        let html = r#"<link rel="icon" href="https://cdn.example.com/fav.png">"#;
        let meta = extract_metadata(html, "http://example.com/page", MAX);
        assert_eq!(
            meta.favicon.as_deref(),
            Some("https://cdn.example.com/fav.png")
        );
    }

    #[test]
    fn test_favicon_root_relative_resolves_to_origin() {
        let html = r#"<link rel="icon" href="/favicon.png">"#;
        let meta = extract_metadata(html, "http://example.com/deep/page", MAX);
        assert_eq!(
            meta.favicon.as_deref(),
            Some("http://example.com/favicon.png")
        );
    }

    #[test]
    fn test_favicon_bare_relative_resolves_to_origin() {
        let html = r#"<link rel="shortcut icon" href="favicon.png">"#;
        let meta = extract_metadata(html, "http://example.com/deep/page", MAX);
        assert_eq!(
            meta.favicon.as_deref(),
            Some("http://example.com/favicon.png")
        );
    }

    #[test]
    fn test_favicon_href_before_rel() {
        let html = r#"<link href="/fav.ico" rel="icon">"#;
        let meta = extract_metadata(html, "http://example.com/", MAX);
        assert_eq!(meta.favicon.as_deref(), Some("http://example.com/fav.ico"));
    }

    #[test]
    fn test_favicon_defaults_to_origin_ico() {
        let meta = extract_metadata("<html></html>", "http://example.com/recipe", MAX);
        assert_eq!(
            meta.favicon.as_deref(),
            Some("http://example.com/favicon.ico")
        );
    }

    #[test]
    fn test_strip_html_removes_script_and_style_blocks() {
        let html = r#"
            <html><head>
            <script>var hidden = "secret";</script>
            <style>.x { color: red }</style>
            </head><body><p>Visible   text</p></body></html>
        "#;
        let text = strip_html(html);
        assert_eq!(text, "Visible text");
        assert!(!text.contains("secret"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_text_truncated_to_cap() {
        let body = "word ".repeat(2000);
        let html = format!("<body>{body}</body>");
        let meta = extract_metadata(&html, "http://example.com/", MAX);
        assert!(meta.text.chars().count() <= MAX);
    }

    #[test]
    fn test_truncation_respects_multibyte_boundaries() {
        let s = "é".repeat(10);
        let cut = truncate_chars(&s, 4);
        assert_eq!(cut, "éééé");
        assert!(cut.is_char_boundary(cut.len()));
    }

    #[test]
    fn test_recipe_page_end_to_end() {
        let html = concat!(
            "<html><head><title>Pasta</title>",
            r#"<meta property="og:image" content="http://example.com/img.jpg">"#,
            "</head><body>Boil water.</body></html>"
        );
        let meta = extract_metadata(html, "http://example.com/recipe", MAX);
        assert_eq!(meta.title.as_deref(), Some("Pasta"));
        assert_eq!(meta.og_image.as_deref(), Some("http://example.com/img.jpg"));
        assert!(meta.og_description.is_none());
        assert_eq!(
            meta.favicon.as_deref(),
            Some("http://example.com/favicon.ico")
        );
        assert!(meta.text.contains("Boil water."));
    }
}
