//! Page assembly: listing, filtering and lookup of posts, and the view
//! models each page is rendered from.

use crate::catalog::{Catalogs, Cover, LinkCategory, LinkEntry, Photo};
use crate::comments::CommentEmbed;
use crate::markdown::RenderedDocument;
use crate::models::{ContentItem, PostDate, PostSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("No post with slug '{0}'")]
    NotFound(String),
}

/// How draft posts are treated by detail-page lookups.
///
/// Drafts never appear in any list regardless of policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftPolicy {
    /// Drafts are not addressable
    #[default]
    Hidden,
    /// Drafts keep a detail page but are never listed
    Unlisted,
}

impl DraftPolicy {
    pub fn addressable(&self, item: &ContentItem) -> bool {
        match self {
            DraftPolicy::Hidden => !item.is_draft(),
            DraftPolicy::Unlisted => true,
        }
    }
}

/// Filters for [`list_posts`]
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Exact, case-sensitive tag to require
    pub tag: Option<String>,
    pub limit: Option<usize>,
    pub excerpt_length: usize,
}

impl ListQuery {
    pub fn new(excerpt_length: usize) -> Self {
        Self {
            excerpt_length,
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Published posts, most recent first.
///
/// Sorting is stable: posts with equal dates keep discovery order, and
/// posts with an invalid date come after every dated one.
pub fn published(items: &[ContentItem]) -> Vec<&ContentItem> {
    let mut posts: Vec<&ContentItem> = items.iter().filter(|item| !item.is_draft()).collect();
    posts.sort_by(|a, b| PostDate::newest_first(a.date(), b.date()));
    posts
}

/// Summaries for a post list
pub fn list_posts(items: &[ContentItem], query: &ListQuery) -> Vec<PostSummary> {
    let filtered = published(items)
        .into_iter()
        .filter(|item| match &query.tag {
            Some(tag) => item.has_tag(tag),
            None => true,
        })
        .map(|item| item.summary(query.excerpt_length));

    match query.limit {
        Some(limit) => filtered.take(limit).collect(),
        None => filtered.collect(),
    }
}

/// Every tag used by a published post, in first-seen order of the sorted list
pub fn all_tags(items: &[ContentItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for item in published(items) {
        for tag in item.tags() {
            if seen.insert(tag.as_str()) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

/// The single post addressed by `slug`
pub fn find_post<'a>(
    items: &'a [ContentItem],
    slug: &str,
    policy: DraftPolicy,
) -> Result<&'a ContentItem, AssemblyError> {
    items
        .iter()
        .find(|item| item.slug == slug && policy.addressable(item))
        .ok_or_else(|| AssemblyError::NotFound(slug.to_string()))
}

/// Slugs that get a detail page, in discovery order
pub fn static_paths(items: &[ContentItem], policy: DraftPolicy) -> Vec<String> {
    items
        .iter()
        .filter(|item| policy.addressable(item))
        .map(|item| item.slug.clone())
        .collect()
}

/// Home page view model
#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub latest: Vec<PostSummary>,
    pub comments: Option<CommentEmbed>,
}

/// Blog index or a single tag's list
#[derive(Debug, Clone, Serialize)]
pub struct BlogIndex {
    pub posts: Vec<PostSummary>,
    pub tags: Vec<String>,
    pub selected_tag: Option<String>,
    pub covers: Vec<Cover>,
}

/// Detail page for one post
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub summary: PostSummary,
    /// Plain-text excerpt for the page's meta description
    pub description: String,
    pub document: RenderedDocument,
    pub comments: Option<CommentEmbed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoversPage {
    pub covers: Vec<Cover>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkSection {
    pub category: LinkCategory,
    pub heading: String,
    pub anchor: String,
    pub links: Vec<LinkEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinksPage {
    pub sections: Vec<LinkSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotosPage {
    pub photos: Vec<Photo>,
}

pub fn home_page(items: &[ContentItem], count: usize, excerpt_length: usize) -> HomePage {
    HomePage {
        latest: list_posts(items, &ListQuery::new(excerpt_length).with_limit(count)),
        comments: None,
    }
}

/// Blog index, narrowed to `tag` when given
pub fn blog_index(
    items: &[ContentItem],
    catalogs: &Catalogs,
    tag: Option<&str>,
    cover_preview_count: usize,
    excerpt_length: usize,
) -> BlogIndex {
    let mut query = ListQuery::new(excerpt_length);
    query.tag = tag.map(str::to_string);

    BlogIndex {
        posts: list_posts(items, &query),
        tags: all_tags(items),
        selected_tag: query.tag,
        covers: catalogs
            .covers_by_date()
            .into_iter()
            .take(cover_preview_count)
            .cloned()
            .collect(),
    }
}

pub fn covers_page(catalogs: &Catalogs) -> CoversPage {
    CoversPage {
        covers: catalogs.covers_by_date().into_iter().cloned().collect(),
    }
}

pub fn links_page(catalogs: &Catalogs) -> LinksPage {
    LinksPage {
        sections: LinkCategory::ALL
            .iter()
            .map(|category| LinkSection {
                category: *category,
                heading: category.heading().to_string(),
                anchor: category.anchor().to_string(),
                links: catalogs.links.entries(*category).to_vec(),
            })
            .collect(),
    }
}

pub fn photos_page(catalogs: &Catalogs) -> PhotosPage {
    PhotosPage {
        photos: catalogs.photos.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse_frontmatter;
    use crate::models::ContentFormat;
    use std::path::PathBuf;

    fn item(slug: &str, header: &str) -> ContentItem {
        let source = format!("---\n{}\n---\nBody of {}\n", header, slug);
        let (frontmatter, body) = parse_frontmatter(&source).unwrap();
        ContentItem {
            slug: slug.to_string(),
            title: frontmatter.title.clone(),
            format: ContentFormat::Markdown,
            source_path: PathBuf::from(format!("posts/{}.md", slug)),
            frontmatter,
            body,
            content_hash: String::new(),
        }
    }

    fn slugs(posts: &[PostSummary]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn test_draft_scenario() {
        let items = vec![
            item("a", "title: A\ndate: 2024-01-01"),
            item("b", "title: B\ndate: 2024-06-01\ndraft: true"),
        ];

        let listed = list_posts(&items, &ListQuery::new(150));
        assert_eq!(slugs(&listed), vec!["a"]);

        assert_eq!(
            find_post(&items, "b", DraftPolicy::Hidden).unwrap_err(),
            AssemblyError::NotFound("b".into())
        );
        assert_eq!(find_post(&items, "b", DraftPolicy::Unlisted).unwrap().slug, "b");

        assert_eq!(static_paths(&items, DraftPolicy::Hidden), vec!["a"]);
        assert_eq!(static_paths(&items, DraftPolicy::Unlisted), vec!["a", "b"]);
    }

    #[test]
    fn test_sort_newest_first_and_stable() {
        let items = vec![
            item("old", "date: 2023-01-01"),
            item("tie-1", "date: 2024-01-01"),
            item("undated", "title: U"),
            item("new", "date: 2024-06-01"),
            item("tie-2", "date: 2024-01-01"),
        ];
        let listed = list_posts(&items, &ListQuery::new(150));
        assert_eq!(
            slugs(&listed),
            vec!["new", "tie-1", "tie-2", "old", "undated"]
        );
    }

    #[test]
    fn test_tag_filter_scenario() {
        let items = vec![
            item("first", "date: 2024-02-01\ntags: [foo, bar]"),
            item("second", "date: 2024-01-01\ntags: [bar]"),
        ];

        let bar = list_posts(&items, &ListQuery::new(150).with_tag("bar"));
        assert_eq!(slugs(&bar), vec!["first", "second"]);

        let foo = list_posts(&items, &ListQuery::new(150).with_tag("foo"));
        assert_eq!(slugs(&foo), vec!["first"]);

        let case = list_posts(&items, &ListQuery::new(150).with_tag("Foo"));
        assert!(case.is_empty());

        let all = list_posts(&items, &ListQuery::new(150));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_limit_and_tags() {
        let items = vec![
            item("one", "date: 2024-03-01\ntags: [rust]"),
            item("two", "date: 2024-02-01\ntags: [music, rust]"),
            item("three", "date: 2024-01-01\ntags: [life]\ndraft: true"),
        ];
        let limited = list_posts(&items, &ListQuery::new(150).with_limit(1));
        assert_eq!(slugs(&limited), vec!["one"]);
        assert_eq!(all_tags(&items), vec!["rust", "music"]);
    }

    #[test]
    fn test_blog_index_for_tag() {
        let items = vec![
            item("x", "date: 2024-03-01\ntags: [a]"),
            item("y", "date: 2024-02-01\ntags: [b]"),
        ];
        let index = blog_index(&items, &Catalogs::default(), Some("b"), 3, 150);
        assert_eq!(slugs(&index.posts), vec!["y"]);
        assert_eq!(index.tags, vec!["a", "b"]);
        assert_eq!(index.selected_tag.as_deref(), Some("b"));
        assert!(index.covers.is_empty());
    }

    #[test]
    fn test_links_page_keeps_category_order() {
        let page = links_page(&Catalogs::default());
        let categories: Vec<_> = page.sections.iter().map(|s| s.category).collect();
        assert_eq!(categories, LinkCategory::ALL.to_vec());
    }
}
