//! Span text normalization applied while cleaning blocks.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),  // ﬀ
    ("\u{FB01}", "fi"),  // ﬁ
    ("\u{FB02}", "fl"),  // ﬂ
    ("\u{FB03}", "ffi"), // ﬃ
    ("\u{FB04}", "ffl"), // ﬄ
    ("\u{FB05}", "st"),  // ﬅ (long s + t)
    ("\u{FB06}", "st"),  // ﬆ
];

fn control_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{Cc}\u{FFFD}]").expect("valid pattern"))
}

fn space_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\t\u{00A0}\u{2000}-\u{200A}\u{202F}\u{205F}\u{3000}]").expect("valid pattern")
    })
}

/// Normalize the text of one span.
///
/// Applies Unicode NFC, expands typographic ligatures, maps exotic
/// spaces to a plain space and drops control and replacement characters.
/// Inner spacing is otherwise kept: spaces between words are part of the
/// span geometry.
pub fn normalize_span_text(text: &str) -> String {
    let mut result: String = text.nfc().collect();

    if result.chars().any(|c| ('\u{FB00}'..='\u{FB06}').contains(&c)) {
        for (ligature, replacement) in LIGATURES {
            result = result.replace(ligature, replacement);
        }
    }

    let result = space_regex().replace_all(&result, " ");
    control_regex().replace_all(&result, "").into_owned()
}
