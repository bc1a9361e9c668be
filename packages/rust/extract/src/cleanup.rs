//! Cell text cleanup applied to every extracted `<td>`/`<th>`.
//!
//! Each pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on the raw text of one cell.
pub(crate) fn clean_cell_text(raw: &str) -> String {
    let mut result = replace_invisible_chars(raw);
    result = collapse_whitespace(&result);
    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: invisible and non-breaking characters
// ---------------------------------------------------------------------------

/// Map NBSP-like spaces to a plain space and drop zero-width characters.
///
/// Report generators pad numeric columns with `&nbsp;` and `&#8203;`, which
/// would otherwise survive as non-empty cells.
fn replace_invisible_chars(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => Some(' '),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}' => None,
            other => Some(other),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pass 2: whitespace
// ---------------------------------------------------------------------------

/// Collapse runs of whitespace (including newlines from markup) into one space.
fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").into_owned()
}
