//! Site building logic - loads content, renders documents and assembles
//! every page's view model before anything is written.

use crate::{
    assembly::{self, BlogIndex, CoversPage, HomePage, LinksPage, PhotosPage, PostPage},
    cache::{content_hash, render_fingerprint, CacheKey, RenderCache},
    catalog::{CatalogError, Catalogs},
    comments::CommentSettings,
    config::Config,
    discovery::{discover, DiscoveredFile, DiscoveryError},
    frontmatter::{parse_frontmatter, FrontmatterError},
    markdown::{MarkdownProcessor, RenderError, RenderedDocument},
    models::*,
    slug::Slugger,
};
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid front matter in {path:?}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    #[error("Failed to render '{slug}': {source}")]
    Render {
        slug: String,
        #[source]
        source: RenderError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Everything loaded from disk for one build pass
#[derive(Debug, Clone, Default)]
pub struct Site {
    /// Parsed items in discovery order
    pub items: Vec<ContentItem>,
    pub catalogs: Catalogs,
    pub diagnostics: Vec<Diagnostic>,
}

/// One tag's list page
#[derive(Debug, Clone)]
pub struct TagPage {
    pub tag: String,
    /// File stem under `blog/tags/`, unique per build
    pub slug: String,
    pub index: BlogIndex,
}

impl TagPage {
    pub fn output_rel_path(&self) -> String {
        tag_rel_path(&self.slug)
    }
}

pub fn tag_rel_path(tag_slug: &str) -> String {
    format!("blog/tags/{}.html", tag_slug)
}

/// View models of every generated page
#[derive(Debug, Clone)]
pub struct SitePages {
    pub home: HomePage,
    pub blog: BlogIndex,
    pub tags: Vec<TagPage>,
    pub posts: Vec<PostPage>,
    pub covers: CoversPage,
    pub links: LinksPage,
    pub photos: PhotosPage,
}

impl SitePages {
    /// Output path of the list page for `tag`, if it has one
    pub fn tag_path(&self, tag: &str) -> Option<String> {
        self.tags
            .iter()
            .find(|page| page.tag == tag)
            .map(TagPage::output_rel_path)
    }
}

/// Main site builder
pub struct SiteBuilder {
    config: Config,
    processor: MarkdownProcessor,
    cache: Option<RenderCache>,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        let processor = MarkdownProcessor::new().with_raw_html(config.render.allow_raw_html);
        let cache = match NonZeroUsize::new(config.cache.capacity) {
            Some(capacity) if config.cache.enabled => Some(RenderCache::load(
                &RenderCache::cache_path(&config.output_dir()),
                capacity,
                &render_fingerprint(config.render.allow_raw_html),
            )),
            _ => None,
        };

        Self {
            config,
            processor,
            cache,
        }
    }

    /// Builder without a render cache, regardless of configuration
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> Option<&RenderCache> {
        self.cache.as_ref()
    }

    /// Discover and parse every content item and load the catalogs.
    pub fn load(&self) -> Result<Site, BuildError> {
        let discovery = discover(&self.config.content_dir(), &self.config.ignore_patterns)?;
        tracing::info!("Found {} content files", discovery.files.len());

        let mut diagnostics = Vec::new();
        for file in &discovery.shadowed {
            diagnostics.push(Diagnostic {
                slug: Some(file.slug.clone()),
                source_path: Some(file.path.display().to_string()),
                ..Diagnostic::new(
                    "slug.duplicate",
                    DiagnosticSeverity::Warning,
                    format!(
                        "'{}' shares its slug with an earlier file and is skipped",
                        file.path.display()
                    ),
                )
            });
        }

        let mut items = Vec::with_capacity(discovery.files.len());
        for file in &discovery.files {
            let item = self.load_item(file)?;
            diagnostics.extend(item_diagnostics(&item));
            items.push(item);
        }

        let catalogs = Catalogs::load(&self.config.data_dir())?;
        for cover in &catalogs.covers {
            if let (Some(raw), None) = (&cover.date, cover.parsed_date()) {
                diagnostics.push(Diagnostic::new(
                    "catalog.cover-date",
                    DiagnosticSeverity::Warning,
                    format!("Cover '{}' has an unreadable date '{}'", cover.title, raw),
                ));
            }
        }

        Ok(Site {
            items,
            catalogs,
            diagnostics,
        })
    }

    /// Read and parse one discovered file
    pub fn load_item(&self, file: &DiscoveredFile) -> Result<ContentItem, BuildError> {
        read_item(file)
    }

    /// Render one item's body, through the cache when enabled
    pub fn render_item(&self, item: &ContentItem) -> Result<RenderedDocument, BuildError> {
        let render = || {
            tracing::debug!("Rendering '{}'", item.slug);
            self.processor
                .render(&item.body)
                .map_err(|source| BuildError::Render {
                    slug: item.slug.clone(),
                    source,
                })
        };

        match &self.cache {
            Some(cache) => cache.get_or_render(CacheKey::for_item(item), render),
            None => render(),
        }
    }

    /// Render every addressable post and assemble all page view models.
    ///
    /// Fails on the first render error; nothing is returned partially.
    pub fn assemble(&self, site: &Site) -> Result<SitePages, BuildError> {
        let build = &self.config.build;
        let comments = self
            .config
            .comments
            .as_ref()
            .map(CommentSettings::from_env);

        let mut posts = Vec::new();
        for slug in assembly::static_paths(&site.items, build.draft_pages) {
            let Ok(item) = assembly::find_post(&site.items, &slug, build.draft_pages) else {
                continue;
            };
            let document = self.render_item(item)?;
            posts.push(PostPage {
                summary: item.summary(build.excerpt_length),
                description: document.plain_excerpt(build.excerpt_length),
                document,
                comments: comments.as_ref().map(|c| c.embed(&item.comment_path())),
            });
        }

        let mut home = assembly::home_page(&site.items, build.home_preview_count, build.excerpt_length);
        home.comments = comments.as_ref().map(CommentSettings::home);

        let blog = assembly::blog_index(
            &site.items,
            &site.catalogs,
            None,
            build.cover_preview_count,
            build.excerpt_length,
        );

        let mut slugger = Slugger::new();
        let tags = blog
            .tags
            .iter()
            .map(|tag| TagPage {
                tag: tag.clone(),
                slug: slugger.slug(tag),
                index: assembly::blog_index(
                    &site.items,
                    &site.catalogs,
                    Some(tag),
                    build.cover_preview_count,
                    build.excerpt_length,
                ),
            })
            .collect();

        if let Some(cache) = &self.cache {
            let stats = cache.stats();
            tracing::info!(
                "Rendered {} posts ({} cached, {} fresh)",
                posts.len(),
                stats.hits,
                stats.misses
            );
        } else {
            tracing::info!("Rendered {} posts", posts.len());
        }

        Ok(SitePages {
            home,
            blog,
            tags,
            posts,
            covers: assembly::covers_page(&site.catalogs),
            links: assembly::links_page(&site.catalogs),
            photos: assembly::photos_page(&site.catalogs),
        })
    }

    /// Persist the render cache next to the build output
    pub fn save_cache(&self) -> io::Result<()> {
        match &self.cache {
            Some(cache) => cache.save(&RenderCache::cache_path(&self.config.output_dir())),
            None => Ok(()),
        }
    }
}

/// Read a content file and parse its front matter
pub fn read_item(file: &DiscoveredFile) -> Result<ContentItem, BuildError> {
    let read_error = |source| BuildError::Read {
        path: file.path.clone(),
        source,
    };
    let bytes = fs::read(&file.path).map_err(read_error)?;
    let hash = content_hash(&bytes);
    let source = String::from_utf8(bytes)
        .map_err(|err| read_error(io::Error::new(io::ErrorKind::InvalidData, err)))?;

    let (frontmatter, body) =
        parse_frontmatter(&source).map_err(|source| BuildError::Frontmatter {
            path: file.path.clone(),
            source,
        })?;

    if !frontmatter.date.is_valid() {
        tracing::warn!(
            "{}: date {} is not a valid date",
            file.path.display(),
            describe_invalid_date(&frontmatter.date)
        );
    }

    let title = if frontmatter.title.trim().is_empty() {
        file.slug.clone()
    } else {
        frontmatter.title.clone()
    };

    Ok(ContentItem {
        slug: file.slug.clone(),
        title,
        format: file.format,
        source_path: file.path.clone(),
        frontmatter,
        body,
        content_hash: hash,
    })
}

fn describe_invalid_date(date: &PostDate) -> String {
    match date {
        PostDate::Invalid(raw) if raw.is_empty() => "(missing)".to_string(),
        PostDate::Invalid(raw) => format!("'{}'", raw),
        PostDate::Valid(dt) => dt.to_rfc3339(),
    }
}

fn item_diagnostics(item: &ContentItem) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if !item.date().is_valid() {
        diagnostics.push(
            Diagnostic::new(
                "date.invalid",
                DiagnosticSeverity::Warning,
                format!(
                    "date {} cannot be read; the post shows '{}' and sorts last",
                    describe_invalid_date(item.date()),
                    INVALID_DATE
                ),
            )
            .for_item(item),
        );
    }
    if item.is_draft() {
        diagnostics.push(
            Diagnostic::new(
                "draft.unlisted",
                DiagnosticSeverity::Info,
                "draft is excluded from every list",
            )
            .for_item(item),
        );
    }
    diagnostics
}
