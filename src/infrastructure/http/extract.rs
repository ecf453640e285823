//! Display-name extraction from channel page HTML.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::domain::models::ExtractionStrategy;

static INITIAL_DATA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ytInitialData\s*=\s*").expect("valid initial data pattern"));

static META_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\s+itemprop="name"\s+content="([^"]+)""#).expect("valid meta name pattern")
});

static OG_TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\s+property="og:title"\s+content="([^"]+)""#)
        .expect("valid og:title pattern")
});

static YOUTUBE_SUFFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-\s+YouTube$").expect("valid title suffix pattern"));

/// Pull a display name out of `html` using `strategy`.
pub fn extract_name(html: &str, strategy: ExtractionStrategy) -> Option<String> {
    match strategy {
        ExtractionStrategy::InitialDataThenMeta => {
            name_from_initial_data(html).or_else(|| name_from_meta(html))
        }
        ExtractionStrategy::MetaOnly => name_from_meta(html),
    }
}

/// `metadata.channelMetadataRenderer.title` from the embedded page data.
pub fn name_from_initial_data(html: &str) -> Option<String> {
    let found = INITIAL_DATA_PATTERN.find(html)?;
    let rest = &html[found.end()..];
    if !rest.starts_with('{') {
        return None;
    }

    // Parse exactly one JSON value; whatever script follows is ignored.
    let data: Value = serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()?
        .ok()?;

    let title = data
        .pointer("/metadata/channelMetadataRenderer/title")?
        .as_str()?;
    non_empty(title)
}

/// `itemprop="name"` meta tag, falling back to `og:title`.
pub fn name_from_meta(html: &str) -> Option<String> {
    if let Some(name) = META_NAME_PATTERN
        .captures(html)
        .and_then(|caps| non_empty(&decode_entities(&caps[1])))
    {
        return Some(name);
    }

    let title = decode_entities(&OG_TITLE_PATTERN.captures(html)?[1]);
    non_empty(&YOUTUBE_SUFFIX_PATTERN.replace(title.trim(), ""))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INITIAL_DATA_PAGE: &str = r#"<html><script>var ytInitialData = {"metadata":{"channelMetadataRenderer":{"title":"  Foo Channel "}},"x":"};"};</script>
<meta itemprop="name" content="Meta Name"></html>"#;

    #[test]
    fn test_initial_data_title() {
        assert_eq!(
            name_from_initial_data(INITIAL_DATA_PAGE).as_deref(),
            Some("Foo Channel")
        );
    }

    #[test]
    fn test_initial_data_preferred_over_meta() {
        assert_eq!(
            extract_name(INITIAL_DATA_PAGE, ExtractionStrategy::InitialDataThenMeta).as_deref(),
            Some("Foo Channel")
        );
        assert_eq!(
            extract_name(INITIAL_DATA_PAGE, ExtractionStrategy::MetaOnly).as_deref(),
            Some("Meta Name")
        );
    }

    #[test]
    fn test_falls_back_to_meta_when_initial_data_malformed() {
        let html = r#"<script>var ytInitialData = {"metadata": ;</script>
<meta itemprop="name" content="Fallback">"#;
        assert_eq!(
            extract_name(html, ExtractionStrategy::InitialDataThenMeta).as_deref(),
            Some("Fallback")
        );
    }

    #[test]
    fn test_og_title_suffix_stripped() {
        let html = r#"<meta property="og:title" content="Bar &amp; Friends - YouTube">"#;
        assert_eq!(name_from_meta(html).as_deref(), Some("Bar & Friends"));
    }

    #[test]
    fn test_no_name() {
        assert_eq!(
            extract_name("<html></html>", ExtractionStrategy::InitialDataThenMeta),
            None
        );
        assert_eq!(name_from_meta(r#"<meta itemprop="name" content="   ">"#), None);
    }
}
