//! # leafpress-render
//!
//! Page templates for leafpress.
//!
//! This crate turns the view models assembled by `leafpress-core` into
//! HTML pages using Askama.

pub mod pages;
pub mod templates;

pub use pages::{PageRenderer, RenderedPage, TemplateError};
pub use templates::{PostEntry, SiteContext, TagLink};
