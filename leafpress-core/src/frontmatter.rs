//! Front matter parsing and metadata normalization.

use crate::models::{Frontmatter, PostDate};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Front matter must be a key-value mapping")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?ms)\A---[ \t]*\r?\n(.*?)^---[ \t]*\r?(?:\n|\z)(.*)\z").unwrap()
    })
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// YAML timestamps may separate the offset with a space
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %:z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Parse front matter from a content file
///
/// Returns a tuple of (frontmatter, body).
/// If no front matter block is present, returns empty metadata with the
/// full content as body.
///
/// # Example
///
/// ```
/// use leafpress_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: My Post\ndate: 2025-01-01\n---\n# Hello World\n";
///
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.title, "My Post");
/// assert_eq!(fm.date.to_iso_string(), "2025-01-01T00:00:00.000Z");
/// assert!(body.starts_with("# Hello World"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    let raw = parse_mapping(yaml)?;
    Ok((frontmatter_from_mapping(raw), body.to_string()))
}

fn parse_mapping(yaml: &str) -> Result<Mapping, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Build the typed view over a declared mapping
pub fn frontmatter_from_mapping(raw: Mapping) -> Frontmatter {
    let title = raw.get("title").map(scalar_to_string).unwrap_or_default();
    let date = normalize_date(raw.get("date"));
    let tags = raw.get("tags").map(tags_from_value).unwrap_or_default();
    let draft = raw.get("draft").is_some_and(is_truthy);

    Frontmatter {
        title,
        date,
        tags,
        draft,
        raw,
    }
}

/// Normalize a declared `date` value.
///
/// Text is parsed as RFC 3339, then as a naive date-time or date (taken as
/// UTC); integers are epoch milliseconds. Anything else, including a
/// missing value, becomes `PostDate::Invalid`.
pub fn normalize_date(value: Option<&Value>) -> PostDate {
    match value {
        Some(Value::String(text)) => parse_date_text(text),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(PostDate::Valid)
            .unwrap_or_else(|| PostDate::Invalid(n.to_string())),
        Some(Value::Tagged(tagged)) => normalize_date(Some(&tagged.value)),
        Some(other) => PostDate::Invalid(scalar_to_string(other)),
        None => PostDate::Invalid(String::new()),
    }
}

fn parse_date_text(text: &str) -> PostDate {
    match parse_date_str(text) {
        Some(dt) => PostDate::Valid(dt),
        None => PostDate::Invalid(text.trim().to_string()),
    }
}

/// Parse a textual date: RFC 3339, a date-time with a spaced offset, or a
/// naive date-time or date taken as UTC.
pub fn parse_date_str(text: &str) -> Option<DateTime<Utc>> {
    let s = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NAIVE_DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

fn tags_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(seq) => seq
            .iter()
            .filter(|v| !matches!(v, Value::Null | Value::Sequence(_) | Value::Mapping(_)))
            .map(scalar_to_string)
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Truthiness of a declared value: `false`, `0`, `""` and `null` are falsy,
/// everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
title: Test Post
date: 2025-01-01
tags: [rust, blog]
---

# Hello World

This is the content."#;

        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title, "Test Post");
        assert_eq!(fm.date.to_iso_string(), "2025-01-01T00:00:00.000Z");
        assert_eq!(fm.tags, vec!["rust", "blog"]);
        assert!(!fm.draft);
        assert!(body.contains("# Hello World"));
        assert!(body.contains("This is the content."));
    }

    #[test]
    fn test_parse_block_list_tags() {
        let content = r#"---
title: Tagged Post
tags:
  - rust
  - programming
---

Content."#;

        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.tags, vec!["rust", "programming"]);
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title, "");
        assert!(fm.raw.is_empty());
        assert!(!fm.date.is_valid());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_block_is_body() {
        let content = "---\ntitle: Never closed\n\nBody";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert!(fm.raw.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block_and_crlf() {
        let (fm, body) = parse_frontmatter("---\n---\nBody").unwrap();
        assert!(fm.raw.is_empty());
        assert_eq!(body, "Body");

        let (fm, body) = parse_frontmatter("---\r\ntitle: Windows\r\n---\r\nBody").unwrap();
        assert_eq!(fm.title, "Windows");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_block_at_end_of_file() {
        let (fm, body) = parse_frontmatter("---\ntitle: Only Meta\n---").unwrap();
        assert_eq!(fm.title, "Only Meta");
        assert_eq!(body, "");
    }

    #[test]
    fn test_draft_truthiness() {
        let (fm, _) = parse_frontmatter("---\ndraft: true\n---\n").unwrap();
        assert!(fm.draft);
        let (fm, _) = parse_frontmatter("---\ndraft: \"yes\"\n---\n").unwrap();
        assert!(fm.draft);
        let (fm, _) = parse_frontmatter("---\ndraft: 1\n---\n").unwrap();
        assert!(fm.draft);
        let (fm, _) = parse_frontmatter("---\ndraft: false\n---\n").unwrap();
        assert!(!fm.draft);
        let (fm, _) = parse_frontmatter("---\ndraft: 0\n---\n").unwrap();
        assert!(!fm.draft);
        let (fm, _) = parse_frontmatter("---\ndraft:\n---\n").unwrap();
        assert!(!fm.draft);
    }

    #[test]
    fn test_date_forms() {
        let value = |s: &str| Value::String(s.to_string());

        assert_eq!(
            normalize_date(Some(&value("2024-06-01T08:30:00+08:00"))).to_iso_string(),
            "2024-06-01T00:30:00.000Z"
        );
        assert_eq!(
            normalize_date(Some(&value("2024-06-01 12:00:00"))).to_iso_string(),
            "2024-06-01T12:00:00.000Z"
        );
        assert_eq!(
            normalize_date(Some(&value("2024-01-01 10:00:00 +08:00"))).to_iso_string(),
            "2024-01-01T02:00:00.000Z"
        );
        assert_eq!(
            normalize_date(Some(&value("2024/06/01"))).to_iso_string(),
            "2024-06-01T00:00:00.000Z"
        );
        assert_eq!(
            normalize_date(Some(&Value::Number(1_700_000_000_000i64.into()))).to_iso_string(),
            "2023-11-14T22:13:20.000Z"
        );
    }

    #[test]
    fn test_yaml_timestamp_with_spaced_offset() {
        let (fm, _) =
            parse_frontmatter("---\ndate: 2024-01-01 10:00:00 +08:00\n---\n").unwrap();
        assert_eq!(fm.date.to_iso_string(), "2024-01-01T02:00:00.000Z");
    }

    #[test]
    fn test_invalid_date_is_not_an_error() {
        let (fm, _) = parse_frontmatter("---\ntitle: Soon\ndate: someday\n---\n").unwrap();
        assert_eq!(fm.date, PostDate::Invalid("someday".into()));
        assert_eq!(fm.date.to_iso_string(), "Invalid Date");

        let (fm, _) = parse_frontmatter("---\ntitle: Undated\n---\n").unwrap();
        assert!(!fm.date.is_valid());
    }

    #[test]
    fn test_invalid_yaml() {
        let content = r#"---
title: Test
invalid yaml: [unclosed
---

Content."#;

        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::Yaml(_))
        ));
    }

    #[test]
    fn test_non_mapping_block() {
        let content = "---\n- just\n- a list\n---\nBody";
        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::NotAMapping)
        ));
    }

    #[test]
    fn test_round_trip_keeps_declared_keys() {
        let content = r#"---
title: Round Trip
date: 2024-01-01
tags: [foo, bar]
cover: /images/a.jpg
series:
  name: notes
  part: 2
---
Body"#;

        let (fm, _) = parse_frontmatter(content).unwrap();
        let yaml = fm.to_yaml().unwrap();
        let (reparsed, _) = parse_frontmatter(&format!("---\n{}---\n", yaml)).unwrap();

        for (key, value) in &fm.raw {
            if key.as_str() == Some("date") {
                continue;
            }
            assert_eq!(reparsed.raw.get(key), Some(value), "key {:?} changed", key);
        }
        assert_eq!(
            reparsed.raw.get("date"),
            Some(&Value::String("2024-01-01T00:00:00.000Z".into()))
        );
        assert_eq!(reparsed.date, fm.date);
        let keys: Vec<_> = reparsed.raw.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["title", "date", "tags", "cover", "series"]);
    }
}
