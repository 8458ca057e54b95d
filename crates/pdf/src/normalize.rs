use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Clean up the text of one extracted span.
///
/// Unicode NFC, ligatures spelled out, bullet glyphs unified to `U+2022`,
/// replacement characters dropped and runs of three or more spaces
/// shortened to two.
pub fn normalize_span_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.nfc() {
        match ch {
            '\u{FFFD}' => {}
            '\u{25CF}' | '\u{25CB}' | '\u{25A0}' => result.push('\u{2022}'),
            _ => match LIGATURES.iter().find(|(lig, _)| *lig == ch) {
                Some((_, spelled)) => result.push_str(spelled),
                None => result.push(ch),
            },
        }
    }

    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    let re_spaces = RE_SPACES.get_or_init(|| Regex::new(r"[ ]{3,}").expect("valid regex"));
    re_spaces.replace_all(&result, "  ").into_owned()
}
