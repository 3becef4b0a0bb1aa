//! Tree cleanup: post-substitution removal of empty nodes.
//!
//! Runs after every resolution pass. Discount stripping and empty
//! substitutions leave blank text nodes behind; this pass drops them,
//! and drops paragraphs left with no children. Nodes still holding an
//! addressable token are never removed, even when visually blank --
//! their content is rendered externally as a control.

use engross_doc::Node;

use crate::token::ADDRESSABLE_RE;

/// Remove empty text nodes and emptied paragraphs, post-order.
pub fn cleanup(doc: Node) -> Node {
    match cleanup_node(doc) {
        Some(node) => node,
        None => Node::empty_doc(),
    }
}

fn cleanup_node(node: Node) -> Option<Node> {
    match node {
        Node::Text { text, marks } => {
            if text.trim().is_empty() && !ADDRESSABLE_RE.is_match(&text) {
                None
            } else {
                Some(Node::Text { text, marks })
            }
        }
        Node::Paragraph { attrs, content } => {
            let kept = cleanup_children(content);
            if kept.is_empty() {
                None
            } else {
                Some(Node::Paragraph {
                    attrs,
                    content: kept,
                })
            }
        }
        // Other containers are kept even when emptied; only paragraphs
        // collapse away.
        Node::Doc { content } => Some(Node::Doc {
            content: cleanup_children(content),
        }),
        Node::Heading { attrs, content } => Some(Node::Heading {
            attrs,
            content: cleanup_children(content),
        }),
        Node::BulletList { attrs, content } => Some(Node::BulletList {
            attrs,
            content: cleanup_children(content),
        }),
        Node::OrderedList { attrs, content } => Some(Node::OrderedList {
            attrs,
            content: cleanup_children(content),
        }),
        Node::ListItem { attrs, content } => Some(Node::ListItem {
            attrs,
            content: cleanup_children(content),
        }),
        Node::Blockquote { attrs, content } => Some(Node::Blockquote {
            attrs,
            content: cleanup_children(content),
        }),
        leaf @ (Node::HorizontalRule | Node::HardBreak) => Some(leaf),
    }
}

fn cleanup_children(content: Vec<Node>) -> Vec<Node> {
    content.into_iter().filter_map(cleanup_node).collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
