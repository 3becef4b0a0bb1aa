//! Script direction inference.
//!
//! When a block carries no explicit `textAlign`, the presentation layer
//! aligns it by the script of its first strongly-directional character.
//! The templating domain is bilingual (Latin + Hebrew), so the check
//! covers the RTL ranges actually seen in stored templates.

/// Rendering direction of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Infer direction from the first strongly-directional character.
/// Digits, punctuation, and whitespace are neutral; all-neutral text
/// defaults to LTR.
pub fn infer_direction(text: &str) -> Direction {
    for ch in text.chars() {
        if is_rtl(ch) {
            return Direction::Rtl;
        }
        if ch.is_alphabetic() {
            return Direction::Ltr;
        }
    }
    Direction::Ltr
}

fn is_rtl(ch: char) -> bool {
    matches!(ch,
        '\u{0590}'..='\u{05FF}'   // Hebrew
        | '\u{FB1D}'..='\u{FB4F}' // Hebrew presentation forms
        | '\u{0600}'..='\u{06FF}' // Arabic
    )
}
