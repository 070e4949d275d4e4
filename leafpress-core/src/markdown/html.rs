//! HTML output for node trees, with per-kind overrides.

use super::node::{Align, Node, NodeKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Replacement renderer for one node kind. Receives the node and the
/// already-rendered HTML of its children.
pub type NodeOverride = Arc<dyn Fn(&Node, &str) -> String + Send + Sync>;

/// Writes a node tree as HTML.
#[derive(Clone, Default)]
pub struct HtmlWriter {
    overrides: HashMap<NodeKind, NodeOverride>,
}

impl fmt::Debug for HtmlWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlWriter")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer used for post pages: tables scroll inside a wrapper and
    /// block quotes carry the `quote` class.
    pub fn site_default() -> Self {
        Self::new()
            .with_override(NodeKind::Table, |_, inner| {
                format!(
                    "<div class=\"table-wrapper\"><table>\n{}</table></div>\n",
                    inner
                )
            })
            .with_override(NodeKind::BlockQuote, |_, inner| {
                format!("<blockquote class=\"quote\">\n{}</blockquote>\n", inner)
            })
    }

    pub fn with_override<F>(mut self, kind: NodeKind, render: F) -> Self
    where
        F: Fn(&Node, &str) -> String + Send + Sync + 'static,
    {
        self.overrides.insert(kind, Arc::new(render));
        self
    }

    pub fn has_override(&self, kind: NodeKind) -> bool {
        self.overrides.contains_key(&kind)
    }

    pub fn render(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.write_node(node, &mut out);
        }
        out
    }

    fn write_node(&self, node: &Node, out: &mut String) {
        let inner = self.render(node.children());
        match self.overrides.get(&node.kind()) {
            Some(render) => out.push_str(&render(node, &inner)),
            None => write_default(node, &inner, out),
        }
    }
}

fn write_default(node: &Node, inner: &str, out: &mut String) {
    match node {
        Node::Paragraph { .. } => {
            out.push_str("<p>");
            out.push_str(inner);
            out.push_str("</p>\n");
        }
        Node::Heading { level, id, .. } => {
            out.push_str(&format!("<h{}", level));
            if let Some(id) = id {
                out.push_str(&format!(" id=\"{}\"", escape_html(id)));
            }
            out.push('>');
            out.push_str(inner);
            out.push_str(&format!("</h{}>\n", level));
        }
        Node::BlockQuote { .. } => {
            out.push_str("<blockquote>\n");
            out.push_str(inner);
            out.push_str("</blockquote>\n");
        }
        Node::List { start: None, .. } => {
            out.push_str("<ul>\n");
            out.push_str(inner);
            out.push_str("</ul>\n");
        }
        Node::List {
            start: Some(start), ..
        } => {
            if *start == 1 {
                out.push_str("<ol>\n");
            } else {
                out.push_str(&format!("<ol start=\"{}\">\n", start));
            }
            out.push_str(inner);
            out.push_str("</ol>\n");
        }
        Node::Item { .. } => {
            out.push_str("<li>");
            out.push_str(inner);
            out.push_str("</li>\n");
        }
        Node::TaskMarker { checked } => {
            if *checked {
                out.push_str("<input disabled=\"\" type=\"checkbox\" checked=\"\"/>\n");
            } else {
                out.push_str("<input disabled=\"\" type=\"checkbox\"/>\n");
            }
        }
        Node::Table { .. } => {
            out.push_str("<table>\n");
            out.push_str(inner);
            out.push_str("</table>\n");
        }
        Node::TableHead { .. } => {
            out.push_str("<thead><tr>");
            out.push_str(inner);
            out.push_str("</tr></thead>\n");
        }
        Node::TableBody { .. } => {
            out.push_str("<tbody>\n");
            out.push_str(inner);
            out.push_str("</tbody>\n");
        }
        Node::TableRow { .. } => {
            out.push_str("<tr>");
            out.push_str(inner);
            out.push_str("</tr>\n");
        }
        Node::TableCell { header, align, .. } => {
            let tag = if *header { "th" } else { "td" };
            match align {
                Align::None => out.push_str(&format!("<{}>", tag)),
                Align::Left => out.push_str(&format!("<{} style=\"text-align: left\">", tag)),
                Align::Center => {
                    out.push_str(&format!("<{} style=\"text-align: center\">", tag))
                }
                Align::Right => out.push_str(&format!("<{} style=\"text-align: right\">", tag)),
            }
            out.push_str(inner);
            out.push_str(&format!("</{}>", tag));
        }
        Node::CodeBlock {
            lang,
            code,
            highlighted,
        } => {
            let body = match highlighted {
                Some(html) => html.clone(),
                None => escape_html(code),
            };
            match lang {
                Some(lang) => {
                    let class = escape_html(lang);
                    out.push_str(&format!(
                        "<pre class=\"language-{0}\"><code class=\"language-{0}\">{1}</code></pre>\n",
                        class, body
                    ));
                }
                None => out.push_str(&format!("<pre><code>{}</code></pre>\n", body)),
            }
        }
        Node::InlineCode { code } => {
            out.push_str("<code>");
            out.push_str(&escape_html(code));
            out.push_str("</code>");
        }
        Node::Math {
            display,
            tex,
            rendered,
        } => match rendered {
            Some(html) => out.push_str(html),
            None if *display => out.push_str(&format!("$${}$$", escape_html(tex))),
            None => out.push_str(&format!("${}$", escape_html(tex))),
        },
        Node::Emphasis { .. } => {
            out.push_str("<em>");
            out.push_str(inner);
            out.push_str("</em>");
        }
        Node::Strong { .. } => {
            out.push_str("<strong>");
            out.push_str(inner);
            out.push_str("</strong>");
        }
        Node::Strikethrough { .. } => {
            out.push_str("<del>");
            out.push_str(inner);
            out.push_str("</del>");
        }
        Node::Link {
            href, title, class, ..
        } => {
            out.push_str(&format!("<a href=\"{}\"", escape_html(&safe_url(href))));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape_html(title)));
            }
            if let Some(class) = class {
                out.push_str(&format!(" class=\"{}\"", escape_html(class)));
            }
            out.push('>');
            out.push_str(inner);
            out.push_str("</a>");
        }
        Node::Image { src, title, alt } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\"",
                escape_html(&safe_url(src)),
                escape_html(alt)
            ));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape_html(title)));
            }
            out.push_str(" />");
        }
        Node::Text { text } => out.push_str(&escape_html(text)),
        Node::Html { html } => out.push_str(html),
        Node::FootnoteReference { label } => {
            let id = escape_html(label);
            out.push_str(&format!(
                "<sup class=\"footnote-reference\"><a href=\"#fn-{0}\">{0}</a></sup>",
                id
            ));
        }
        Node::FootnoteDefinition { label, .. } => {
            let id = escape_html(label);
            out.push_str(&format!(
                "<div class=\"footnote-definition\" id=\"fn-{0}\"><sup class=\"footnote-definition-label\">{0}</sup>\n",
                id
            ));
            out.push_str(inner);
            out.push_str("</div>\n");
        }
        Node::Rule => out.push_str("<hr />\n"),
        Node::SoftBreak => out.push('\n'),
        Node::HardBreak => out.push_str("<br />\n"),
    }
}

const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// `url`, or `#` when it uses a script-capable scheme.
///
/// Inline `data:image/` URLs are allowed.
pub fn safe_url(url: &str) -> String {
    let normalized: String = url
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if normalized.starts_with("data:image/") {
        return url.to_string();
    }
    if UNSAFE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
    {
        tracing::debug!("Dropping unsafe URL {:?}", url);
        return "#".to_string();
    }
    url.to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
