//! Askama template definitions.

use askama::Template;
use leafpress_core::{Config, Cover, LinkEntry, Photo};

/// Site-wide values every page shows
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub title: String,
    pub author: String,
    pub description: String,
    pub intro: Option<String>,
    /// Normalized, always starts and ends with `/`
    pub base_url: String,
    pub year: i32,
}

impl SiteContext {
    pub fn from_config(config: &Config, year: i32) -> Self {
        Self {
            title: config.site.title.clone(),
            author: config.site.author.clone(),
            description: config.site.description.clone(),
            intro: config.site.intro.clone(),
            base_url: config.normalized_base_url(),
            year,
        }
    }

    /// Site-absolute URL for an output-relative path
    pub fn url(&self, rel_path: &str) -> String {
        format!("{}{}", self.base_url, rel_path.trim_start_matches('/'))
    }
}

/// A tag with the URL of its list page
#[derive(Debug, Clone)]
pub struct TagLink {
    pub name: String,
    pub url: String,
    pub selected: bool,
}

/// A post in a list
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub url: String,
    pub title: String,
    pub date: String,
    /// ISO form for `<time datetime>`, empty when the date is invalid
    pub datetime: String,
    pub tags: Vec<TagLink>,
    pub excerpt: String,
}

/// A cover with its display date
#[derive(Debug, Clone)]
pub struct CoverEntry {
    pub title: String,
    pub artist: String,
    pub cover_image: String,
    pub audio_url: String,
    pub description: String,
    pub date: String,
}

impl From<&Cover> for CoverEntry {
    fn from(cover: &Cover) -> Self {
        Self {
            title: cover.title.clone(),
            artist: cover.artist.clone(),
            cover_image: cover.cover_image.clone(),
            audio_url: cover.audio_url.clone(),
            description: cover.description.clone(),
            date: cover.display_date(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkGroup {
    pub heading: String,
    pub anchor: String,
    pub links: Vec<LinkEntry>,
}

#[derive(Debug, Clone)]
pub struct HeadingEntry {
    pub level: u8,
    pub text: String,
    pub id: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub site: SiteContext,
    /// Most recent posts
    pub posts: Vec<PostEntry>,
    pub comments_json: Option<String>,
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub site: SiteContext,
    pub heading: String,
    pub posts: Vec<PostEntry>,
    pub tags: Vec<TagLink>,
    pub all_posts_url: String,
    pub covers: Vec<CoverEntry>,
    pub covers_url: String,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub site: SiteContext,
    pub post: PostEntry,
    pub description: String,
    pub content: String,
    pub toc: Vec<HeadingEntry>,
    pub has_math: bool,
    pub comments_json: Option<String>,
}

#[derive(Template)]
#[template(path = "covers.html")]
pub struct CoversTemplate {
    pub site: SiteContext,
    pub covers: Vec<CoverEntry>,
}

#[derive(Template)]
#[template(path = "links.html")]
pub struct LinksTemplate {
    pub site: SiteContext,
    pub groups: Vec<LinkGroup>,
}

#[derive(Template)]
#[template(path = "photos.html")]
pub struct PhotosTemplate {
    pub site: SiteContext,
    pub photos: Vec<Photo>,
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub site: SiteContext,
}
