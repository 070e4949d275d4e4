//! Content model structs for posts, dates, summaries and diagnostics.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_yaml::Mapping;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Text shown wherever a date could not be normalized.
pub const INVALID_DATE: &str = "Invalid Date";

/// Source format of a content file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Markdown,
    Mdx,
}

impl ContentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" => Some(ContentFormat::Markdown),
            "mdx" => Some(ContentFormat::Mdx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContentFormat::Markdown => "md",
            ContentFormat::Mdx => "mdx",
        }
    }
}

/// Normalized `date` front matter value.
///
/// A value that could not be read as a date is kept as `Invalid` with the
/// offending source text; it renders as `Invalid Date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostDate {
    Valid(DateTime<Utc>),
    Invalid(String),
}

impl PostDate {
    pub fn is_valid(&self) -> bool {
        matches!(self, PostDate::Valid(_))
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            PostDate::Valid(dt) => Some(dt),
            PostDate::Invalid(_) => None,
        }
    }

    /// ISO-8601 instant with millisecond precision (`2024-01-01T00:00:00.000Z`)
    pub fn to_iso_string(&self) -> String {
        match self {
            PostDate::Valid(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            PostDate::Invalid(_) => INVALID_DATE.to_string(),
        }
    }

    /// Calendar date for display (`2024-01-01`)
    pub fn display(&self) -> String {
        match self {
            PostDate::Valid(dt) => dt.format("%Y-%m-%d").to_string(),
            PostDate::Invalid(_) => INVALID_DATE.to_string(),
        }
    }

    /// Ordering for "most recent first" listings. Invalid dates sort after
    /// every valid one and compare equal among themselves.
    pub fn newest_first(a: &PostDate, b: &PostDate) -> Ordering {
        match (a, b) {
            (PostDate::Valid(a), PostDate::Valid(b)) => b.cmp(a),
            (PostDate::Valid(_), PostDate::Invalid(_)) => Ordering::Less,
            (PostDate::Invalid(_), PostDate::Valid(_)) => Ordering::Greater,
            (PostDate::Invalid(_), PostDate::Invalid(_)) => Ordering::Equal,
        }
    }
}

impl Default for PostDate {
    fn default() -> Self {
        PostDate::Invalid(String::new())
    }
}

impl Serialize for PostDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

/// Front matter metadata from a content file
#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    /// Declared title, empty when absent
    pub title: String,

    /// Normalized `date`
    pub date: PostDate,

    /// Tags in authored order
    pub tags: Vec<String>,

    /// Excluded from published listings when set
    pub draft: bool,

    /// Every declared key, in authored order
    pub raw: Mapping,
}

impl Frontmatter {
    /// Look up any declared key
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.raw.get(key)
    }

    /// Declared keys with `date` replaced by its normalized form
    pub fn normalized(&self) -> Mapping {
        let mut mapping = self.raw.clone();
        if let Some(date) = mapping.get_mut("date") {
            *date = serde_yaml::Value::String(self.date.to_iso_string());
        }
        mapping
    }

    /// Re-serialize the metadata block (without `---` fences)
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        if self.raw.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(&self.normalized())
    }
}

/// One discovered content file, parsed
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// File name without extension (e.g., "hello-world")
    pub slug: String,

    /// Display title (front matter title, or the slug)
    pub title: String,

    pub format: ContentFormat,

    pub source_path: PathBuf,

    pub frontmatter: Frontmatter,

    /// Raw markup after the front matter block
    pub body: String,

    /// Hex blake3 hash of the source bytes
    pub content_hash: String,
}

impl ContentItem {
    pub fn is_draft(&self) -> bool {
        self.frontmatter.draft
    }

    pub fn date(&self) -> &PostDate {
        &self.frontmatter.date
    }

    pub fn tags(&self) -> &[String] {
        &self.frontmatter.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.frontmatter.tags.iter().any(|t| t == tag)
    }

    /// Relative output path of the detail page (no leading slash)
    pub fn output_rel_path(&self) -> String {
        post_rel_path(&self.slug)
    }

    /// Thread path handed to the comment widget
    pub fn comment_path(&self) -> String {
        format!("/blog/{}", self.slug)
    }

    /// Summary for list views, excerpt cut at `excerpt_length` characters
    pub fn summary(&self, excerpt_length: usize) -> PostSummary {
        PostSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            date: self.frontmatter.date.clone(),
            tags: self.frontmatter.tags.clone(),
            excerpt: excerpt(&self.body, excerpt_length),
            url: self.output_rel_path(),
        }
    }
}

/// Post as shown in list views
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: PostDate,
    pub tags: Vec<String>,
    pub excerpt: String,
    /// Relative output path (e.g., "blog/hello.html")
    pub url: String,
}

pub fn post_rel_path(slug: &str) -> String {
    format!("blog/{}.html", slug)
}

fn excerpt(body: &str, length: usize) -> String {
    body.trim_start().chars().take(length).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Info,
    Warning,
    Error,
}

/// Something `verify` should tell the author about
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl Diagnostic {
    pub fn new(code: &str, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity,
            slug: None,
            source_path: None,
        }
    }

    pub fn for_item(mut self, item: &ContentItem) -> Self {
        self.slug = Some(item.slug.clone());
        self.source_path = Some(item.source_path.display().to_string());
        self
    }
}
