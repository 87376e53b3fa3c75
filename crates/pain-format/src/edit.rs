//! Whole-document replacement edits.

use lsp_types::{Position, Range, TextEdit};

/// Builds a single edit replacing the entire document text.
#[must_use]
pub fn whole_document_edit(original: &str, new_text: impl Into<String>) -> TextEdit {
    TextEdit {
        range: Range::new(Position::new(0, 0), end_position(original)),
        new_text: new_text.into(),
    }
}

/// Position just past the final character of `text`.
///
/// Column offsets count UTF-16 code units, the protocol's default position
/// encoding.
fn end_position(text: &str) -> Position {
    let mut line = 0_u32;
    let mut character = 0_u32;
    for ch in text.chars() {
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            // len_utf16 is 1 or 2, so the conversion cannot fail.
            character += u32::try_from(ch.len_utf16()).unwrap_or(2);
        }
    }
    Position { line, character }
}
