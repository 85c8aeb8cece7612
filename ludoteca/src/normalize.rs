//! Text post-processing for generated and listed words.
//!
//! Every secret word goes through [`normalize`] before a game sees it, which is
//! what lets the guess engine compare plain uppercase ASCII letters.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Normalize raw word text.
///
/// The text is decomposed (NFD) and its combining marks dropped, so `É`
/// becomes `E` and `ç` becomes `c`. Letters with no decomposition are
/// transliterated (`ß` to `SS`, `Ø` to `O`, `Æ` to `AE`). Whitespace runs
/// collapse to a single space, every character that is not an ASCII letter,
/// a space or a hyphen is deleted, the result is trimmed and uppercased.
///
/// Applying `normalize` to its own output returns that output unchanged.
pub fn normalize(text: &str) -> String {
    let mut kept = String::with_capacity(text.len());
    for c in text.nfd().filter(|&c| !is_combining_mark(c)) {
        if let Some(folded) = transliterate(c) {
            kept.push_str(folded);
        } else if c.is_whitespace() {
            kept.push(' ');
        } else if c.is_ascii_alphabetic() || c == '-' {
            kept.push(c.to_ascii_uppercase());
        }
    }

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Latin letters that NFD leaves whole.
fn transliterate(c: char) -> Option<&'static str> {
    let folded = match c {
        'ç' | 'Ç' => "C",
        'ß' | 'ẞ' => "SS",
        'Æ' | 'æ' => "AE",
        'Œ' | 'œ' => "OE",
        'Ø' | 'ø' => "O",
        'Ł' | 'ł' => "L",
        'Đ' | 'đ' | 'Ð' | 'ð' => "D",
        'Þ' | 'þ' => "TH",
        'Ħ' | 'ħ' => "H",
        'ı' => "I",
        _ => return None,
    };
    Some(folded)
}

/// Normalize a single guessed character, if it survives normalization as a
/// single guessable symbol.
pub fn normalize_char(c: char) -> Option<char> {
    let mut buf = [0; 4];
    let normalized = normalize(c.encode_utf8(&mut buf));
    let mut chars = normalized.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != ' ' => Some(c),
        _ => None,
    }
}
