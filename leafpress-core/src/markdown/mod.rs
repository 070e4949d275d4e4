//! Markdown processing pipeline.
//!
//! Source text is parsed into pulldown-cmark events, folded into a typed
//! [`Node`] tree and run through the passes below before [`HtmlWriter`]
//! turns it into HTML:
//!
//! 1. GFM extensions and math delimiters (parser options)
//! 2. unterminated display math check
//! 3. heading ids
//! 4. heading self-links
//! 5. code highlighting
//! 6. math markup

pub mod anchors;
pub mod highlight;
pub mod html;
pub mod math;
pub mod node;

use pulldown_cmark::{Event, Options, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use anchors::HeadingAnchor;
pub use html::HtmlWriter;
pub use node::{Node, NodeKind};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unterminated display math near {0:?}")]
    UnterminatedMath(String),

    #[error("Failed to highlight {lang} code block: {source}")]
    Highlight {
        lang: String,
        #[source]
        source: syntect::Error,
    },
}

/// A rendered document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub nodes: Vec<Node>,
    pub headings: Vec<HeadingAnchor>,
}

impl RenderedDocument {
    pub fn to_html(&self, writer: &HtmlWriter) -> String {
        writer.render(&self.nodes)
    }

    /// Whitespace-collapsed plain text, cut at `length` characters
    pub fn plain_excerpt(&self, length: usize) -> String {
        let text: Vec<String> = self.nodes.iter().map(Node::plain_text).collect();
        text.join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(length)
            .collect()
    }
}

/// Markdown processor with the site's extensions
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
    options: Options,
    allow_raw_html: bool,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        options.insert(Options::ENABLE_MATH);

        Self {
            options,
            allow_raw_html: false,
        }
    }

    /// Pass raw HTML in the body through unescaped
    pub fn with_raw_html(mut self, allow: bool) -> Self {
        self.allow_raw_html = allow;
        self
    }

    pub fn render(&self, markdown: &str) -> Result<RenderedDocument, RenderError> {
        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();
        math::check_unterminated(&events)?;

        let mut nodes = node::build_tree(events, self.allow_raw_html);
        let headings = anchors::assign_heading_ids(&mut nodes);
        anchors::autolink_headings(&mut nodes);
        highlight::highlight_code_blocks(&mut nodes)?;
        math::render_math(&mut nodes);

        Ok(RenderedDocument { nodes, headings })
    }

    /// Render straight to HTML with [`HtmlWriter::site_default`]
    pub fn render_html(&self, markdown: &str) -> Result<String, RenderError> {
        Ok(self.render(markdown)?.to_html(&HtmlWriter::site_default()))
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}
