//! Content normalization: heterogeneous stored template content →
//! canonical `doc` tree.
//!
//! Stored templates arrive in several shapes: a canonical `doc` tree, a
//! bare node array, a single node, a JSON string encoding any of those,
//! a raw HTML string, or a legacy `{html, delta}` wrapper. Every branch
//! is total -- nothing here returns an error or panics. Unrecoverable
//! input degrades to an empty document plus a recorded warning.
//!
//! Per-node conversion walks `serde_json::Value` by hand and skips
//! unknown node kinds for forward compatibility.

use serde_json::Value;

use crate::html::html_to_doc;
use crate::node::{BlockAttrs, HeadingAttrs, Mark, Node};

// ──────────────────────────────────────────────
// Inputs and warnings
// ──────────────────────────────────────────────

/// Raw template content as handed over by the template store.
#[derive(Debug, Clone)]
pub enum TemplateInput {
    /// Already-decoded JSON content (doc tree, node array, single node,
    /// `{html, delta}` wrapper, or a JSON string of any of those).
    Json(Value),
    /// Raw text: either JSON source or HTML.
    Text(String),
}

/// Non-fatal findings recorded while normalizing. These surface to the
/// caller; normalization itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeWarning {
    /// Input matched none of the accepted shapes; degraded to an
    /// empty document.
    #[error("unrecognized template content ({detail}); using empty document")]
    UnrecognizedContent { detail: String },
    /// A node with an unknown `type` was skipped.
    #[error("skipped unknown node type '{node_type}'")]
    UnknownNodeType { node_type: String },
    /// A mark with an unknown `type` was dropped.
    #[error("dropped unknown mark '{mark}'")]
    UnknownMark { mark: String },
    /// An `{html, delta}` wrapper carried no usable `html` string.
    #[error("legacy wrapper without an html body; using empty document")]
    EmptyLegacyWrapper,
}

// ──────────────────────────────────────────────
// Entry points
// ──────────────────────────────────────────────

/// Normalize any accepted template shape into a canonical `doc` node.
/// Never fails; degraded input is reported through the warning list.
pub fn normalize(input: &TemplateInput) -> (Node, Vec<NormalizeWarning>) {
    let mut warnings = Vec::new();
    let doc = match input {
        TemplateInput::Text(raw) => normalize_text(raw, &mut warnings),
        TemplateInput::Json(value) => normalize_value(value, &mut warnings),
    };
    for warning in &warnings {
        tracing::warn!(target: "engross::normalize", "{warning}");
    }
    (doc, warnings)
}

fn normalize_text(raw: &str, warnings: &mut Vec<NormalizeWarning>) -> Node {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => normalize_value(&value, warnings),
        // Not JSON: treat the string as HTML.
        Err(_) => html_to_doc(raw),
    }
}

fn normalize_value(value: &Value, warnings: &mut Vec<NormalizeWarning>) -> Node {
    match value {
        // A JSON string encoding one of the other shapes.
        Value::String(raw) => normalize_text(raw, warnings),

        // A bare node array becomes the document body.
        Value::Array(items) => Node::Doc {
            content: nodes_from_array(items, warnings),
        },

        Value::Object(obj) => {
            // Legacy rich-text wrapper: only the accompanying HTML is
            // interpreted; the delta payload is not.
            if let Some(html) = obj.get("html") {
                return match html.as_str() {
                    Some(html) => html_to_doc(html),
                    None => {
                        warnings.push(NormalizeWarning::EmptyLegacyWrapper);
                        Node::empty_doc()
                    }
                };
            }
            if obj.contains_key("delta") {
                warnings.push(NormalizeWarning::EmptyLegacyWrapper);
                return Node::empty_doc();
            }

            if obj.get("type").and_then(Value::as_str) == Some("doc") {
                // Canonical doc: pass through, coercing a missing or
                // malformed content field to an empty sequence.
                let content = match obj.get("content").and_then(Value::as_array) {
                    Some(items) => nodes_from_array(items, warnings),
                    None => vec![],
                };
                return Node::Doc { content };
            }

            // A single node gets wrapped as the document body.
            if obj.contains_key("type") && obj.contains_key("content") {
                if let Some(node) = node_from_value(value, warnings) {
                    return Node::Doc {
                        content: vec![node],
                    };
                }
                return Node::empty_doc();
            }

            warnings.push(NormalizeWarning::UnrecognizedContent {
                detail: "object is neither a node nor a legacy wrapper".into(),
            });
            Node::empty_doc()
        }

        other => {
            warnings.push(NormalizeWarning::UnrecognizedContent {
                detail: format!("unsupported JSON value ({})", json_type_name(other)),
            });
            Node::empty_doc()
        }
    }
}

// ──────────────────────────────────────────────
// Per-node conversion
// ──────────────────────────────────────────────

fn nodes_from_array(items: &[Value], warnings: &mut Vec<NormalizeWarning>) -> Vec<Node> {
    items
        .iter()
        .filter_map(|item| node_from_value(item, warnings))
        .collect()
}

fn node_from_value(value: &Value, warnings: &mut Vec<NormalizeWarning>) -> Option<Node> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            warnings.push(NormalizeWarning::UnknownNodeType {
                node_type: json_type_name(value).to_string(),
            });
            return None;
        }
    };
    let node_type = obj.get("type").and_then(Value::as_str).unwrap_or("");

    let node = match node_type {
        "paragraph" => Node::Paragraph {
            attrs: attrs_of(obj),
            content: content_of(obj, warnings),
        },
        "heading" => Node::Heading {
            attrs: heading_attrs_of(obj),
            content: content_of(obj, warnings),
        },
        "bulletList" => Node::BulletList {
            attrs: attrs_of(obj),
            content: content_of(obj, warnings),
        },
        "orderedList" => Node::OrderedList {
            attrs: attrs_of(obj),
            content: content_of(obj, warnings),
        },
        "listItem" => Node::ListItem {
            attrs: attrs_of(obj),
            content: content_of(obj, warnings),
        },
        "blockquote" => Node::Blockquote {
            attrs: attrs_of(obj),
            content: content_of(obj, warnings),
        },
        "horizontalRule" => Node::HorizontalRule,
        "hardBreak" => Node::HardBreak,
        "text" => Node::Text {
            text: obj
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            marks: marks_of(obj, warnings),
        },
        other => {
            warnings.push(NormalizeWarning::UnknownNodeType {
                node_type: other.to_string(),
            });
            return None;
        }
    };
    Some(node)
}

fn content_of(
    obj: &serde_json::Map<String, Value>,
    warnings: &mut Vec<NormalizeWarning>,
) -> Vec<Node> {
    match obj.get("content").and_then(Value::as_array) {
        Some(items) => nodes_from_array(items, warnings),
        None => vec![],
    }
}

fn attrs_of(obj: &serde_json::Map<String, Value>) -> Option<BlockAttrs> {
    let text_align = obj
        .get("attrs")
        .and_then(|a| a.get("textAlign"))
        .and_then(Value::as_str)?;
    Some(BlockAttrs::aligned(text_align))
}

fn heading_attrs_of(obj: &serde_json::Map<String, Value>) -> HeadingAttrs {
    let attrs = obj.get("attrs");
    let level = attrs
        .and_then(|a| a.get("level"))
        .and_then(Value::as_u64)
        .unwrap_or(1);
    HeadingAttrs {
        level: (level.min(6) as u8).clamp(1, 6),
        text_align: attrs
            .and_then(|a| a.get("textAlign"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Accept both `{"type": "bold"}` objects and bare `"bold"` strings;
/// unknown marks are dropped with a warning.
fn marks_of(
    obj: &serde_json::Map<String, Value>,
    warnings: &mut Vec<NormalizeWarning>,
) -> Vec<Mark> {
    let items = match obj.get("marks").and_then(Value::as_array) {
        Some(items) => items,
        None => return vec![],
    };
    let mut marks = Vec::new();
    for item in items {
        let name = item
            .as_str()
            .or_else(|| item.get("type").and_then(Value::as_str))
            .unwrap_or("");
        match Mark::parse(name) {
            Some(mark) => {
                if !marks.contains(&mark) {
                    marks.push(mark);
                }
            }
            None => warnings.push(NormalizeWarning::UnknownMark {
                mark: name.to_string(),
            }),
        }
    }
    marks
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
