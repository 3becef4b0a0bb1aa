//! Field id assignment: the single-fire pass that turns unbound
//! `{{text}}` / `{{signature}}` occurrences into addressable tokens.
//!
//! One counter is shared across the entire depth-first, left-to-right
//! traversal, so "the 3rd field in the document" keeps its id across
//! re-renders. Only the bare, id-less form matches; running the pass
//! against already-addressed content is a no-op.

use crate::token::BARE_FIELD_RE;
use engross_doc::Node;

/// Sequence state threaded through the whole traversal. Never
/// re-initialized per branch.
struct AssignCursor {
    next: u32,
}

/// Bind every unbound `{{text}}` / `{{signature}}` to a stable id:
/// `{{text:text-1}}`, `{{signature:signature-2}}`, … in document order.
pub fn assign_field_ids(doc: Node) -> Node {
    let mut cursor = AssignCursor { next: 1 };
    doc.map_text(&mut |text| {
        BARE_FIELD_RE
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let kind = &caps[1];
                let id = cursor.next;
                cursor.next += 1;
                format!("{{{{{kind}:{kind}-{id}}}}}")
            })
            .into_owned()
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
