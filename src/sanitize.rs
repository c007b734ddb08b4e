//! Text made safe for the document's built-in fonts: 7-bit ASCII only.
//!
//! Known typographic characters get an ASCII stand-in; emoji, pictographs and
//! every other non-ASCII character are dropped. Only applied to document text,
//! on-screen text keeps its original characters.

use unicode_normalization::UnicodeNormalization;

fn replacement(ch: char) -> Option<&'static str> {
    Some(match ch {
        '\u{2013}' | '\u{2014}' => "-",
        '\u{2018}' | '\u{2019}' => "'",
        '\u{201C}' | '\u{201D}' => "\"",
        '\u{2026}' => "...",
        '\u{2022}' => "*",
        '\u{2192}' => ">",
        '\u{2190}' => "<",
        '\u{2191}' => "^",
        '\u{2193}' => "v",
        '\u{2713}' => "v",
        '\u{2717}' => "x",
        '\u{26A0}' | '\u{26A1}' => "!",
        '\u{2605}' | '\u{2606}' => "*",
        _ => return None,
    })
}

/// Total and idempotent; the result is trimmed and pure ASCII.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else if let Some(rep) = replacement(ch) {
            out.push_str(rep);
        }
    }
    out.trim().to_string()
}

/// NFKC compatibility folding first, so `Ａ` or `ﬁ` survive as `A` and `fi`.
pub fn sanitize_folded(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    sanitize(&folded)
}
