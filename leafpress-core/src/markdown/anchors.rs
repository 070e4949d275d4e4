//! Heading ids and heading self-links.

use super::node::{walk_mut, Node};
use crate::slug::Slugger;
use serde::{Deserialize, Serialize};

/// A heading with its assigned id, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAnchor {
    pub level: u8,
    pub text: String,
    pub id: String,
}

pub const ANCHOR_CLASS: &str = "heading-anchor";

/// Give every heading a document-unique id.
///
/// Explicit `{#id}` attributes are kept (suffixed if already taken); the
/// rest are slugged from the heading text.
pub fn assign_heading_ids(nodes: &mut [Node]) -> Vec<HeadingAnchor> {
    let mut slugger = Slugger::new();
    let mut anchors = Vec::new();

    walk_mut(nodes, &mut |node| {
        if let Node::Heading { .. } = node {
            let text = node.plain_text();
            if let Node::Heading { level, id, .. } = node {
                let assigned = match id.take() {
                    Some(explicit) if !explicit.is_empty() => slugger.claim(explicit),
                    _ => slugger.slug(&text),
                };
                *id = Some(assigned.clone());
                anchors.push(HeadingAnchor {
                    level: *level,
                    text: text.trim().to_string(),
                    id: assigned,
                });
            }
        }
    });

    anchors
}

/// Wrap each heading's content in a link to the heading itself.
pub fn autolink_headings(nodes: &mut [Node]) {
    walk_mut(nodes, &mut |node| {
        if let Node::Heading {
            id: Some(id),
            children,
            ..
        } = node
        {
            if matches!(children.as_slice(), [Node::Link { class: Some(class), .. }] if class == ANCHOR_CLASS)
            {
                return;
            }
            let inner = std::mem::take(children);
            children.push(Node::Link {
                href: format!("#{}", id),
                title: String::new(),
                class: Some(ANCHOR_CLASS.to_string()),
                children: inner,
            });
        }
    });
}
