//! # leafpress-core
//!
//! Core library for the leafpress blog build pipeline.
//!
//! This crate discovers content files, parses their front matter, renders
//! markdown bodies into a typed node tree, and assembles the view models
//! every page of the site is rendered from.

pub mod assembly;
pub mod builder;
pub mod cache;
pub mod catalog;
pub mod comments;
pub mod config;
pub mod discovery;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod slug;

pub use assembly::{AssemblyError, DraftPolicy, ListQuery};
pub use builder::{BuildError, Site, SiteBuilder, SitePages, TagPage};
pub use cache::{CacheKey, RenderCache};
pub use catalog::{Catalogs, Cover, LinkCategory, LinkEntry, Photo};
pub use comments::CommentEmbed;
pub use config::Config;
pub use markdown::{HtmlWriter, MarkdownProcessor, RenderedDocument};
pub use models::{
    ContentFormat, ContentItem, Diagnostic, DiagnosticSeverity, Frontmatter, PostDate,
    PostSummary,
};
pub use slug::slugify;
