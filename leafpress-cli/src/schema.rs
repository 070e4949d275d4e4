//! JSON payloads printed by `--json` / `--format json`.

use leafpress_core::markdown::HeadingAnchor;
use leafpress_core::{ContentItem, PostSummary};
use serde::Serialize;

pub const SCHEMA_VERSION: &str = "leafpress-v1";

/// Standard envelope for machine-consumable responses.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub schema_version: &'static str,
    pub kind: &'static str,
    pub data: T,
}

pub fn envelope<T>(kind: &'static str, data: T) -> Envelope<T> {
    Envelope {
        schema_version: SCHEMA_VERSION,
        kind,
        data,
    }
}

#[derive(Serialize)]
pub struct PostListData {
    pub tag: Option<String>,
    pub total: usize,
    pub posts: Vec<PostEntry>,
}

#[derive(Serialize)]
pub struct PostEntry {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub date: String,
    pub tags: Vec<String>,
    pub excerpt: String,
}

impl PostEntry {
    pub fn from_summary(summary: PostSummary, base_url: &str) -> Self {
        Self {
            url: format!("{}{}", base_url, summary.url),
            date: summary.date.to_iso_string(),
            slug: summary.slug,
            title: summary.title,
            tags: summary.tags,
            excerpt: summary.excerpt,
        }
    }
}

#[derive(Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

impl From<&HeadingAnchor> for TocEntry {
    fn from(anchor: &HeadingAnchor) -> Self {
        Self {
            level: anchor.level,
            id: anchor.id.clone(),
            text: anchor.text.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub date: String,
    pub tags: Vec<String>,
    pub draft: bool,
    pub frontmatter: serde_yaml::Mapping,
    pub content_html: String,
    pub raw_markdown: String,
    pub toc: Vec<TocEntry>,
}

impl PostData {
    pub fn new(
        item: &ContentItem,
        base_url: &str,
        content_html: String,
        headings: &[HeadingAnchor],
    ) -> Self {
        Self {
            slug: item.slug.clone(),
            title: item.title.clone(),
            url: format!("{}{}", base_url, item.output_rel_path()),
            date: item.date().to_iso_string(),
            tags: item.tags().to_vec(),
            draft: item.is_draft(),
            frontmatter: item.frontmatter.normalized(),
            content_html,
            raw_markdown: item.body.clone(),
            toc: headings.iter().map(TocEntry::from).collect(),
        }
    }
}
