//! HTML ingestion: HTML string → canonical document tree.
//!
//! Stored templates from the legacy editor arrive as HTML (directly or
//! inside `{html, delta}` wrappers). html5ever is total over arbitrary
//! input, so this module never fails: unrecognized markup degrades to
//! transparent traversal and stray inline content is wrapped in a
//! paragraph.

use std::cell::RefCell;

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, Attribute, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::node::{BlockAttrs, HeadingAttrs, Mark, Node};

/// Convert an HTML string into a canonical `doc` node.
pub fn html_to_doc(html: &str) -> Node {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let root = find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone());

    let mut blocks = Vec::new();
    collect_blocks(&root, &mut blocks);
    Node::Doc { content: blocks }
}

// ──────────────────────────────────────────────
// Block context
// ──────────────────────────────────────────────

fn collect_blocks(handle: &Handle, blocks: &mut Vec<Node>) {
    // Inline content encountered directly at block level accumulates
    // here and is flushed as a synthetic paragraph.
    let mut pending: Vec<Node> = Vec::new();

    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                let text = collapse_whitespace(&contents.borrow());
                if pending.is_empty() && text.trim().is_empty() {
                    // Formatting whitespace between block elements.
                    continue;
                }
                if !text.is_empty() {
                    pending.push(Node::text(text));
                }
            }
            NodeData::Element { name, attrs, .. } => {
                let tag = name.local.as_ref();
                match tag {
                    "p" => {
                        flush_pending(&mut pending, blocks);
                        blocks.push(Node::Paragraph {
                            attrs: block_attrs(attrs),
                            content: collect_inline_children(child, &[]),
                        });
                    }
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        flush_pending(&mut pending, blocks);
                        let level = tag
                            .strip_prefix('h')
                            .and_then(|n| n.parse::<u8>().ok())
                            .unwrap_or(1);
                        blocks.push(Node::Heading {
                            attrs: HeadingAttrs {
                                level: level.clamp(1, 6),
                                text_align: text_align_of(attrs),
                            },
                            content: collect_inline_children(child, &[]),
                        });
                    }
                    "ul" | "ol" => {
                        flush_pending(&mut pending, blocks);
                        let items = collect_list_items(child);
                        blocks.push(if tag == "ul" {
                            Node::BulletList {
                                attrs: block_attrs(attrs),
                                content: items,
                            }
                        } else {
                            Node::OrderedList {
                                attrs: block_attrs(attrs),
                                content: items,
                            }
                        });
                    }
                    "blockquote" => {
                        flush_pending(&mut pending, blocks);
                        let mut inner = Vec::new();
                        collect_blocks(child, &mut inner);
                        blocks.push(Node::Blockquote {
                            attrs: block_attrs(attrs),
                            content: inner,
                        });
                    }
                    "hr" => {
                        flush_pending(&mut pending, blocks);
                        blocks.push(Node::HorizontalRule);
                    }
                    "br" => pending.push(Node::HardBreak),
                    _ => {
                        if let Some(mark) = mark_for_tag(tag) {
                            collect_inline(child, &[mark], &mut pending);
                        } else if is_inline_tag(tag) {
                            collect_inline(child, &[], &mut pending);
                        } else {
                            // div/section/article/... are transparent.
                            flush_pending(&mut pending, blocks);
                            collect_blocks(child, blocks);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    flush_pending(&mut pending, blocks);
}

fn collect_list_items(list: &Handle) -> Vec<Node> {
    let mut items = Vec::new();
    for child in list.children.borrow().iter() {
        if let NodeData::Element { name, attrs, .. } = &child.data {
            if name.local.as_ref() == "li" {
                let mut inner = Vec::new();
                collect_blocks(child, &mut inner);
                items.push(Node::ListItem {
                    attrs: block_attrs(attrs),
                    content: inner,
                });
            }
        }
    }
    items
}

fn flush_pending(pending: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    if pending.is_empty() {
        return;
    }
    let content = std::mem::take(pending);
    let all_blank = content
        .iter()
        .all(|n| n.text_content().is_some_and(|t| t.trim().is_empty()));
    if !all_blank {
        blocks.push(Node::paragraph(content));
    }
}

// ──────────────────────────────────────────────
// Inline context
// ──────────────────────────────────────────────

fn collect_inline_children(handle: &Handle, marks: &[Mark]) -> Vec<Node> {
    let mut out = Vec::new();
    collect_inline(handle, marks, &mut out);
    out
}

fn collect_inline(handle: &Handle, marks: &[Mark], out: &mut Vec<Node>) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                let text = collapse_whitespace(&contents.borrow());
                if !text.is_empty() {
                    out.push(Node::marked_text(text, marks.to_vec()));
                }
            }
            NodeData::Element { name, .. } => {
                let tag = name.local.as_ref();
                if tag == "br" {
                    out.push(Node::HardBreak);
                } else if let Some(mark) = mark_for_tag(tag) {
                    let mut extended = marks.to_vec();
                    if !extended.contains(&mark) {
                        extended.push(mark);
                    }
                    collect_inline(child, &extended, out);
                } else {
                    // Unknown or block-in-inline markup: flatten through.
                    collect_inline(child, marks, out);
                }
            }
            _ => {}
        }
    }
}

// ──────────────────────────────────────────────
// Element classification
// ──────────────────────────────────────────────

fn mark_for_tag(tag: &str) -> Option<Mark> {
    match tag {
        "strong" | "b" => Some(Mark::Bold),
        "em" | "i" => Some(Mark::Italic),
        "u" => Some(Mark::Underline),
        "s" | "strike" | "del" => Some(Mark::Strike),
        _ => None,
    }
}

fn is_inline_tag(tag: &str) -> bool {
    matches!(tag, "span" | "a" | "code" | "small" | "sub" | "sup" | "label")
}

fn block_attrs(attrs: &RefCell<Vec<Attribute>>) -> Option<BlockAttrs> {
    text_align_of(attrs).map(|a| BlockAttrs { text_align: Some(a) })
}

/// Extract a text alignment from either an `align` attribute or a
/// `style="text-align: …"` declaration.
fn text_align_of(attrs: &RefCell<Vec<Attribute>>) -> Option<String> {
    for attr in attrs.borrow().iter() {
        let name = attr.name.local.as_ref();
        if name == "align" {
            return Some(attr.value.to_string());
        }
        if name == "style" {
            for decl in attr.value.split(';') {
                if let Some((key, value)) = decl.split_once(':') {
                    if key.trim().eq_ignore_ascii_case("text-align") {
                        return Some(value.trim().to_string());
                    }
                }
            }
        }
    }
    None
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if name.local.as_ref() == tag {
            return Some(handle.clone());
        }
    }
    for child in handle.children.borrow().iter() {
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Collapse runs of HTML whitespace to single spaces, preserving
/// boundary spaces so adjacent inline runs keep their separation.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_ws = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_ws {
                out.push(' ');
            }
            prev_ws = true;
        } else {
            out.push(ch);
            prev_ws = false;
        }
    }
    out
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paragraph_roundtrip() {
        let doc = html_to_doc("<p>Hi</p>");
        assert_eq!(
            doc.to_value(),
            json!({
                "type": "doc",
                "content": [
                    { "type": "paragraph", "content": [ { "type": "text", "text": "Hi" } ] }
                ]
            })
        );
    }

    #[test]
    fn marks_nest_and_dedupe() {
        let doc = html_to_doc("<p>plain <strong>bold <em>both</em></strong></p>");
        assert_eq!(
            doc.to_value(),
            json!({
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [
                        { "type": "text", "text": "plain " },
                        { "type": "text", "text": "bold ", "marks": [ { "type": "bold" } ] },
                        { "type": "text", "text": "both", "marks": [ { "type": "bold" }, { "type": "italic" } ] }
                    ]
                }]
            })
        );
    }

    #[test]
    fn headings_and_lists() {
        let doc = html_to_doc("<h2>Terms</h2><ul><li>one</li><li>two</li></ul>");
        let value = doc.to_value();
        assert_eq!(value["content"][0]["type"], "heading");
        assert_eq!(value["content"][0]["attrs"]["level"], 2);
        assert_eq!(value["content"][1]["type"], "bulletList");
        assert_eq!(value["content"][1]["content"][0]["type"], "listItem");
        assert_eq!(
            value["content"][1]["content"][1]["content"][0]["content"][0]["text"],
            "two"
        );
    }

    #[test]
    fn stray_text_wraps_in_paragraph() {
        let doc = html_to_doc("just some text");
        assert_eq!(
            doc.to_value(),
            json!({
                "type": "doc",
                "content": [
                    { "type": "paragraph", "content": [ { "type": "text", "text": "just some text" } ] }
                ]
            })
        );
    }

    #[test]
    fn text_align_style_carries() {
        let doc = html_to_doc(r#"<p style="text-align: center">centered</p>"#);
        assert_eq!(doc.to_value()["content"][0]["attrs"]["textAlign"], "center");
    }

    #[test]
    fn divs_are_transparent_and_br_becomes_hard_break() {
        let doc = html_to_doc("<div><p>a<br>b</p></div><hr>");
        let value = doc.to_value();
        assert_eq!(value["content"][0]["content"][1]["type"], "hardBreak");
        assert_eq!(value["content"][1]["type"], "horizontalRule");
    }

    #[test]
    fn empty_input_yields_empty_doc() {
        assert_eq!(html_to_doc(""), Node::empty_doc());
    }

    #[test]
    fn interblock_whitespace_is_dropped() {
        let doc = html_to_doc("<p>a</p>\n    <p>b</p>");
        assert_eq!(doc.children().len(), 2);
    }
}
