//! Turns assembled view models into finished pages.

use crate::templates::*;
use askama::Template;
use leafpress_core::assembly::{BlogIndex, PostPage};
use leafpress_core::markdown::{HtmlWriter, Node};
use leafpress_core::{CommentEmbed, PostSummary, SitePages, TagPage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to render {page}: {source}")]
    Render {
        page: String,
        #[source]
        source: askama::Error,
    },

    #[error("Failed to serialize comment options: {0}")]
    Comments(#[from] serde_json::Error),
}

/// A finished page and where it goes under the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub path: String,
    pub html: String,
}

/// Renders every page of an assembled site
pub struct PageRenderer<'a> {
    site: SiteContext,
    pages: &'a SitePages,
    writer: HtmlWriter,
}

impl<'a> PageRenderer<'a> {
    pub fn new(site: SiteContext, pages: &'a SitePages) -> Self {
        Self {
            site,
            pages,
            writer: HtmlWriter::site_default(),
        }
    }

    /// Use a custom writer for post bodies
    pub fn with_writer(mut self, writer: HtmlWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Every page in output order: home, blog index, tags, posts, catalogs, 404
    pub fn render_all(&self) -> Result<Vec<RenderedPage>, TemplateError> {
        let mut pages = vec![
            self.page("index.html", &self.home()?)?,
            self.page("blog/index.html", &self.blog(&self.pages.blog, "Blog"))?,
        ];
        for tag in &self.pages.tags {
            pages.push(self.page(&tag.output_rel_path(), &self.tag(tag))?);
        }
        for post in &self.pages.posts {
            pages.push(self.page(&post.summary.url, &self.post(post)?)?);
        }
        pages.push(self.page("covers.html", &self.covers())?);
        pages.push(self.page("links.html", &self.links())?);
        pages.push(self.page("photos.html", &self.photos())?);
        pages.push(self.page("404.html", &NotFoundTemplate { site: self.site.clone() })?);
        Ok(pages)
    }

    fn page<T: Template>(&self, path: &str, template: &T) -> Result<RenderedPage, TemplateError> {
        let html = template.render().map_err(|source| TemplateError::Render {
            page: path.to_string(),
            source,
        })?;
        Ok(RenderedPage {
            path: path.to_string(),
            html,
        })
    }

    pub fn home(&self) -> Result<HomeTemplate, TemplateError> {
        Ok(HomeTemplate {
            site: self.site.clone(),
            posts: self.entries(&self.pages.home.latest),
            comments_json: comments_json(self.pages.home.comments.as_ref())?,
        })
    }

    pub fn blog(&self, index: &BlogIndex, heading: &str) -> BlogTemplate {
        let selected = index.selected_tag.as_deref();
        BlogTemplate {
            site: self.site.clone(),
            heading: heading.to_string(),
            posts: self.entries(&index.posts),
            tags: index
                .tags
                .iter()
                .filter_map(|tag| {
                    self.tag_link(tag).map(|mut link| {
                        link.selected = selected == Some(tag.as_str());
                        link
                    })
                })
                .collect(),
            all_posts_url: self.site.url("blog/"),
            covers: index.covers.iter().map(CoverEntry::from).collect(),
            covers_url: self.site.url("covers.html"),
        }
    }

    pub fn tag(&self, page: &TagPage) -> BlogTemplate {
        self.blog(&page.index, &format!("#{}", page.tag))
    }

    pub fn post(&self, page: &PostPage) -> Result<PostTemplate, TemplateError> {
        Ok(PostTemplate {
            site: self.site.clone(),
            post: self.entry(&page.summary),
            description: page.description.clone(),
            content: page.document.to_html(&self.writer),
            toc: page
                .document
                .headings
                .iter()
                .map(|h| HeadingEntry {
                    level: h.level,
                    text: h.text.clone(),
                    id: h.id.clone(),
                })
                .collect(),
            has_math: contains_math(&page.document.nodes),
            comments_json: comments_json(page.comments.as_ref())?,
        })
    }

    pub fn covers(&self) -> CoversTemplate {
        CoversTemplate {
            site: self.site.clone(),
            covers: self.pages.covers.covers.iter().map(CoverEntry::from).collect(),
        }
    }

    pub fn links(&self) -> LinksTemplate {
        LinksTemplate {
            site: self.site.clone(),
            groups: self
                .pages
                .links
                .sections
                .iter()
                .map(|section| LinkGroup {
                    heading: section.heading.clone(),
                    anchor: section.anchor.clone(),
                    links: section.links.clone(),
                })
                .collect(),
        }
    }

    pub fn photos(&self) -> PhotosTemplate {
        PhotosTemplate {
            site: self.site.clone(),
            photos: self.pages.photos.photos.clone(),
        }
    }

    fn tag_link(&self, tag: &str) -> Option<TagLink> {
        self.pages.tag_path(tag).map(|path| TagLink {
            name: tag.to_string(),
            url: self.site.url(&path),
            selected: false,
        })
    }

    fn entries(&self, posts: &[PostSummary]) -> Vec<PostEntry> {
        posts.iter().map(|post| self.entry(post)).collect()
    }

    fn entry(&self, post: &PostSummary) -> PostEntry {
        PostEntry {
            url: self.site.url(&post.url),
            title: post.title.clone(),
            date: post.date.display(),
            datetime: if post.date.is_valid() {
                post.date.to_iso_string()
            } else {
                String::new()
            },
            tags: post
                .tags
                .iter()
                .map(|tag| {
                    // Tags of unlisted drafts may have no list page
                    self.tag_link(tag).unwrap_or_else(|| TagLink {
                        name: tag.clone(),
                        url: self.site.url("blog/"),
                        selected: false,
                    })
                })
                .collect(),
            excerpt: post.excerpt.clone(),
        }
    }
}

/// Widget options as a JSON literal safe to inline in `<script>`
fn comments_json(embed: Option<&CommentEmbed>) -> Result<Option<String>, TemplateError> {
    match embed {
        Some(embed) => Ok(Some(embed.to_json()?.replace("</", "<\\/"))),
        None => Ok(None),
    }
}

fn contains_math(nodes: &[Node]) -> bool {
    nodes
        .iter()
        .any(|node| matches!(node, Node::Math { .. }) || contains_math(node.children()))
}
