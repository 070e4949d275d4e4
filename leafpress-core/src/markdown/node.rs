//! Typed node tree built from pulldown-cmark events.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Tag, TagEnd};
use serde::{Deserialize, Serialize};

/// Column alignment of a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl From<Alignment> for Align {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::None => Align::None,
            Alignment::Left => Align::Left,
            Alignment::Center => Align::Center,
            Alignment::Right => Align::Right,
        }
    }
}

/// One node of a rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        level: u8,
        id: Option<String>,
        children: Vec<Node>,
    },
    BlockQuote {
        children: Vec<Node>,
    },
    List {
        /// First number of an ordered list, `None` for bullets
        start: Option<u64>,
        children: Vec<Node>,
    },
    Item {
        children: Vec<Node>,
    },
    TaskMarker {
        checked: bool,
    },
    Table {
        children: Vec<Node>,
    },
    TableHead {
        children: Vec<Node>,
    },
    TableBody {
        children: Vec<Node>,
    },
    TableRow {
        children: Vec<Node>,
    },
    TableCell {
        header: bool,
        align: Align,
        children: Vec<Node>,
    },
    CodeBlock {
        /// Language tag of a fenced block
        lang: Option<String>,
        code: String,
        /// Highlighted markup, when the language is known
        highlighted: Option<String>,
    },
    InlineCode {
        code: String,
    },
    Math {
        display: bool,
        tex: String,
        rendered: Option<String>,
    },
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Strikethrough {
        children: Vec<Node>,
    },
    Link {
        href: String,
        title: String,
        class: Option<String>,
        children: Vec<Node>,
    },
    Image {
        src: String,
        title: String,
        alt: String,
    },
    Text {
        text: String,
    },
    /// Raw markup passed through unescaped
    Html {
        html: String,
    },
    FootnoteReference {
        label: String,
    },
    FootnoteDefinition {
        label: String,
        children: Vec<Node>,
    },
    Rule,
    SoftBreak,
    HardBreak,
}

/// Variant tag of a [`Node`], used to key rendering overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    Heading,
    BlockQuote,
    List,
    Item,
    TaskMarker,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
    CodeBlock,
    InlineCode,
    Math,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    Text,
    Html,
    FootnoteReference,
    FootnoteDefinition,
    Rule,
    SoftBreak,
    HardBreak,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::Heading { .. } => NodeKind::Heading,
            Node::BlockQuote { .. } => NodeKind::BlockQuote,
            Node::List { .. } => NodeKind::List,
            Node::Item { .. } => NodeKind::Item,
            Node::TaskMarker { .. } => NodeKind::TaskMarker,
            Node::Table { .. } => NodeKind::Table,
            Node::TableHead { .. } => NodeKind::TableHead,
            Node::TableBody { .. } => NodeKind::TableBody,
            Node::TableRow { .. } => NodeKind::TableRow,
            Node::TableCell { .. } => NodeKind::TableCell,
            Node::CodeBlock { .. } => NodeKind::CodeBlock,
            Node::InlineCode { .. } => NodeKind::InlineCode,
            Node::Math { .. } => NodeKind::Math,
            Node::Emphasis { .. } => NodeKind::Emphasis,
            Node::Strong { .. } => NodeKind::Strong,
            Node::Strikethrough { .. } => NodeKind::Strikethrough,
            Node::Link { .. } => NodeKind::Link,
            Node::Image { .. } => NodeKind::Image,
            Node::Text { .. } => NodeKind::Text,
            Node::Html { .. } => NodeKind::Html,
            Node::FootnoteReference { .. } => NodeKind::FootnoteReference,
            Node::FootnoteDefinition { .. } => NodeKind::FootnoteDefinition,
            Node::Rule => NodeKind::Rule,
            Node::SoftBreak => NodeKind::SoftBreak,
            Node::HardBreak => NodeKind::HardBreak,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::Item { children }
            | Node::Table { children }
            | Node::TableHead { children }
            | Node::TableBody { children }
            | Node::TableRow { children }
            | Node::TableCell { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Strikethrough { children }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::Item { children }
            | Node::Table { children }
            | Node::TableHead { children }
            | Node::TableBody { children }
            | Node::TableRow { children }
            | Node::TableCell { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Strikethrough { children }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Concatenated text content, as a reader would see it
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } => out.push_str(text),
        Node::InlineCode { code } => out.push_str(code),
        Node::Math { tex, .. } => out.push_str(tex),
        Node::SoftBreak | Node::HardBreak => out.push(' '),
        other => {
            for child in other.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Visit every node depth-first, parents before children.
pub fn walk_mut(nodes: &mut [Node], f: &mut dyn FnMut(&mut Node)) {
    for node in nodes.iter_mut() {
        f(node);
        if let Some(children) = node.children_mut() {
            walk_mut(children, f);
        }
    }
}

enum Frame {
    Open(Node),
    /// Container that contributes no node of its own
    Transparent,
}

#[derive(Default)]
struct TableState {
    alignments: Vec<Align>,
    in_head: bool,
    cell: usize,
}

/// Fold a flat event stream into a node tree.
///
/// Raw HTML becomes a `Text` node (escaped on output) unless
/// `allow_raw_html` is set.
pub fn build_tree(events: Vec<Event<'_>>, allow_raw_html: bool) -> Vec<Node> {
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut table = TableState::default();

    for event in events {
        match event {
            Event::Start(tag) => {
                if matches!(tag, Tag::TableRow) && !table.in_head {
                    if let Some(Frame::Open(Node::Table { .. })) = stack.last() {
                        stack.push(Frame::Open(Node::TableBody {
                            children: Vec::new(),
                        }));
                    }
                }
                stack.push(open_frame(tag, &mut table));
            }
            Event::End(end) => {
                match end {
                    TagEnd::TableHead => table.in_head = false,
                    TagEnd::Table => {
                        if let Some(Frame::Open(Node::TableBody { .. })) = stack.last() {
                            close_frame(&mut stack, &mut roots);
                        }
                        table = TableState::default();
                    }
                    _ => {}
                }
                close_frame(&mut stack, &mut roots);
            }
            Event::Text(text) => match current_node(&mut stack) {
                Some(Node::CodeBlock { code, .. }) => code.push_str(&text),
                Some(Node::Image { alt, .. }) => alt.push_str(&text),
                _ => push_leaf(
                    &mut stack,
                    &mut roots,
                    Node::Text {
                        text: text.into_string(),
                    },
                ),
            },
            Event::Code(code) => match current_node(&mut stack) {
                Some(Node::Image { alt, .. }) => alt.push_str(&code),
                _ => push_leaf(
                    &mut stack,
                    &mut roots,
                    Node::InlineCode {
                        code: code.into_string(),
                    },
                ),
            },
            Event::Html(html) | Event::InlineHtml(html) => {
                let node = if allow_raw_html {
                    Node::Html {
                        html: html.into_string(),
                    }
                } else {
                    Node::Text {
                        text: html.into_string(),
                    }
                };
                push_leaf(&mut stack, &mut roots, node);
            }
            Event::InlineMath(tex) => push_leaf(
                &mut stack,
                &mut roots,
                Node::Math {
                    display: false,
                    tex: tex.into_string(),
                    rendered: None,
                },
            ),
            Event::DisplayMath(tex) => push_leaf(
                &mut stack,
                &mut roots,
                Node::Math {
                    display: true,
                    tex: tex.into_string(),
                    rendered: None,
                },
            ),
            Event::FootnoteReference(label) => push_leaf(
                &mut stack,
                &mut roots,
                Node::FootnoteReference {
                    label: label.into_string(),
                },
            ),
            Event::TaskListMarker(checked) => {
                push_leaf(&mut stack, &mut roots, Node::TaskMarker { checked })
            }
            Event::SoftBreak => push_leaf(&mut stack, &mut roots, Node::SoftBreak),
            Event::HardBreak => push_leaf(&mut stack, &mut roots, Node::HardBreak),
            Event::Rule => push_leaf(&mut stack, &mut roots, Node::Rule),
        }
    }

    // Unbalanced streams should not happen, but never drop content
    while !stack.is_empty() {
        close_frame(&mut stack, &mut roots);
    }

    roots
}

fn open_frame(tag: Tag<'_>, table: &mut TableState) -> Frame {
    let children = Vec::new();
    let node = match tag {
        Tag::Paragraph => Node::Paragraph { children },
        Tag::Heading { level, id, .. } => Node::Heading {
            level: level as u8,
            id: id.map(|s| s.into_string()),
            children,
        },
        Tag::BlockQuote(_) => Node::BlockQuote { children },
        Tag::CodeBlock(kind) => Node::CodeBlock {
            lang: match kind {
                CodeBlockKind::Fenced(info) => fence_language(&info),
                CodeBlockKind::Indented => None,
            },
            code: String::new(),
            highlighted: None,
        },
        Tag::List(start) => Node::List { start, children },
        Tag::Item => Node::Item { children },
        Tag::FootnoteDefinition(label) => Node::FootnoteDefinition {
            label: label.into_string(),
            children,
        },
        Tag::Table(alignments) => {
            *table = TableState {
                alignments: alignments.into_iter().map(Align::from).collect(),
                in_head: false,
                cell: 0,
            };
            Node::Table { children }
        }
        Tag::TableHead => {
            table.in_head = true;
            table.cell = 0;
            Node::TableHead { children }
        }
        Tag::TableRow => {
            table.cell = 0;
            Node::TableRow { children }
        }
        Tag::TableCell => {
            let align = table.alignments.get(table.cell).copied().unwrap_or_default();
            table.cell += 1;
            Node::TableCell {
                header: table.in_head,
                align,
                children,
            }
        }
        Tag::Emphasis => Node::Emphasis { children },
        Tag::Strong => Node::Strong { children },
        Tag::Strikethrough => Node::Strikethrough { children },
        Tag::Link {
            dest_url, title, ..
        } => Node::Link {
            href: dest_url.into_string(),
            title: title.into_string(),
            class: None,
            children,
        },
        Tag::Image {
            dest_url, title, ..
        } => Node::Image {
            src: dest_url.into_string(),
            title: title.into_string(),
            alt: String::new(),
        },
        Tag::HtmlBlock
        | Tag::Superscript
        | Tag::Subscript
        | Tag::DefinitionList
        | Tag::DefinitionListTitle
        | Tag::DefinitionListDefinition
        | Tag::MetadataBlock(_) => return Frame::Transparent,
    };
    Frame::Open(node)
}

/// First word of a fence info string (```` ```rust,ignore ```` → `rust`)
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

fn current_node(stack: &mut [Frame]) -> Option<&mut Node> {
    stack.iter_mut().rev().find_map(|frame| match frame {
        Frame::Open(node) => Some(node),
        Frame::Transparent => None,
    })
}

/// Attach `node` to the nearest open node. Inside an image, markup is
/// flattened into the alt text.
fn push_leaf(stack: &mut [Frame], roots: &mut Vec<Node>, node: Node) {
    match current_node(stack) {
        Some(Node::Image { alt, .. }) => alt.push_str(&node.plain_text()),
        Some(parent) => match parent.children_mut() {
            Some(children) => children.push(node),
            None => roots.push(node),
        },
        None => roots.push(node),
    }
}

fn close_frame(stack: &mut Vec<Frame>, roots: &mut Vec<Node>) {
    if let Some(Frame::Open(node)) = stack.pop() {
        push_leaf(stack, roots, node);
    }
}
