//! Canonical document tree shared by every templating pass.
//!
//! These types are produced by the normalizer and consumed throughout
//! the resolution pipeline. Every pass treats a tree as an immutable
//! snapshot and returns a rebuilt tree; callers must always use the
//! latest returned value.

use serde::Serialize;

// ──────────────────────────────────────────────
// Marks
// ──────────────────────────────────────────────

/// Inline formatting mark carried by a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
}

impl Mark {
    /// Parse a canonical mark name. Unknown names return `None`.
    pub fn parse(name: &str) -> Option<Mark> {
        match name {
            "bold" => Some(Mark::Bold),
            "italic" => Some(Mark::Italic),
            "underline" => Some(Mark::Underline),
            "strike" => Some(Mark::Strike),
            _ => None,
        }
    }
}

// ──────────────────────────────────────────────
// Attributes
// ──────────────────────────────────────────────

/// Attributes shared by block nodes. `text_align` is carried verbatim
/// for the presentation layer; when absent, alignment is inferred from
/// script direction (see [`crate::direction`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockAttrs {
    #[serde(rename = "textAlign", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
}

impl BlockAttrs {
    pub fn aligned(text_align: impl Into<String>) -> BlockAttrs {
        BlockAttrs {
            text_align: Some(text_align.into()),
        }
    }
}

/// Heading attributes. `level` is clamped to `[1,6]` on ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingAttrs {
    pub level: u8,
    #[serde(rename = "textAlign", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
}

impl HeadingAttrs {
    pub fn level(level: u8) -> HeadingAttrs {
        HeadingAttrs {
            level: level.clamp(1, 6),
            text_align: None,
        }
    }
}

// ──────────────────────────────────────────────
// Nodes
// ──────────────────────────────────────────────

/// A document node. Only `Doc` is a valid root; only `Text` carries
/// placeholder tokens. Serializes to the canonical editor JSON shape
/// (`{"type":"doc","content":[...]}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Doc {
        content: Vec<Node>,
    },
    Paragraph {
        #[serde(skip_serializing_if = "Option::is_none")]
        attrs: Option<BlockAttrs>,
        content: Vec<Node>,
    },
    Heading {
        attrs: HeadingAttrs,
        content: Vec<Node>,
    },
    BulletList {
        #[serde(skip_serializing_if = "Option::is_none")]
        attrs: Option<BlockAttrs>,
        content: Vec<Node>,
    },
    OrderedList {
        #[serde(skip_serializing_if = "Option::is_none")]
        attrs: Option<BlockAttrs>,
        content: Vec<Node>,
    },
    ListItem {
        #[serde(skip_serializing_if = "Option::is_none")]
        attrs: Option<BlockAttrs>,
        content: Vec<Node>,
    },
    Blockquote {
        #[serde(skip_serializing_if = "Option::is_none")]
        attrs: Option<BlockAttrs>,
        content: Vec<Node>,
    },
    HorizontalRule,
    HardBreak,
    Text {
        text: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
}

impl Node {
    // ── Constructors ────────────────────────────────────────────────

    pub fn doc(content: Vec<Node>) -> Node {
        Node::Doc { content }
    }

    pub fn empty_doc() -> Node {
        Node::Doc { content: vec![] }
    }

    pub fn paragraph(content: Vec<Node>) -> Node {
        Node::Paragraph {
            attrs: None,
            content,
        }
    }

    pub fn text(text: impl Into<String>) -> Node {
        Node::Text {
            text: text.into(),
            marks: vec![],
        }
    }

    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Node {
        Node::Text {
            text: text.into(),
            marks,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Child nodes in document order; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Doc { content }
            | Node::Paragraph { content, .. }
            | Node::Heading { content, .. }
            | Node::BulletList { content, .. }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content, .. }
            | Node::Blockquote { content, .. } => content,
            Node::HorizontalRule | Node::HardBreak | Node::Text { .. } => &[],
        }
    }

    pub fn is_doc(&self) -> bool {
        matches!(self, Node::Doc { .. })
    }

    /// Text content of a `Text` node, `None` otherwise.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Node::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Concatenate all text in document order into `out`. Hard breaks
    /// and block boundaries contribute newlines so phrases from
    /// adjacent blocks never run together.
    pub fn flatten_text(&self, out: &mut String) {
        match self {
            Node::Text { text, .. } => out.push_str(text),
            Node::HardBreak => out.push('\n'),
            Node::HorizontalRule => {}
            Node::Doc { content } | Node::BulletList { content, .. } | Node::OrderedList { content, .. } => {
                for child in content {
                    child.flatten_text(out);
                }
            }
            Node::Paragraph { content, .. }
            | Node::Heading { content, .. }
            | Node::ListItem { content, .. }
            | Node::Blockquote { content, .. } => {
                for child in content {
                    child.flatten_text(out);
                }
                out.push('\n');
            }
        }
    }

    // ── Rebuilding traversals ───────────────────────────────────────

    /// Depth-first, left-to-right map over every `Text` node's content.
    /// The closure is shared across the whole traversal, so stateful
    /// rewrites (sequence counters, cursors) observe document order.
    pub fn map_text<F>(self, f: &mut F) -> Node
    where
        F: FnMut(&str) -> String,
    {
        match self {
            Node::Text { text, marks } => Node::Text {
                text: f(&text),
                marks,
            },
            Node::Doc { content } => Node::Doc {
                content: map_children(content, f),
            },
            Node::Paragraph { attrs, content } => Node::Paragraph {
                attrs,
                content: map_children(content, f),
            },
            Node::Heading { attrs, content } => Node::Heading {
                attrs,
                content: map_children(content, f),
            },
            Node::BulletList { attrs, content } => Node::BulletList {
                attrs,
                content: map_children(content, f),
            },
            Node::OrderedList { attrs, content } => Node::OrderedList {
                attrs,
                content: map_children(content, f),
            },
            Node::ListItem { attrs, content } => Node::ListItem {
                attrs,
                content: map_children(content, f),
            },
            Node::Blockquote { attrs, content } => Node::Blockquote {
                attrs,
                content: map_children(content, f),
            },
            leaf @ (Node::HorizontalRule | Node::HardBreak) => leaf,
        }
    }

    /// Serialize to the canonical editor JSON value. Serialization of
    /// these types cannot fail; the fallback exists only to keep the
    /// output contract total.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .unwrap_or_else(|_| serde_json::json!({ "type": "doc", "content": [] }))
    }
}

fn map_children<F>(content: Vec<Node>, f: &mut F) -> Vec<Node>
where
    F: FnMut(&str) -> String,
{
    content.into_iter().map(|child| child.map_text(f)).collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
