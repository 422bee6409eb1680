//! Czech collation for alphabetical project ordering.
//!
//! Comparison runs on three levels. The primary level orders letters by the
//! Czech alphabet, where `č`, `ř`, `š`, `ž` follow their base letters and the
//! digraph `ch` sits between `h` and `i`. The remaining accents (`á`, `é`,
//! `ě`, `ď`, `ů`, ...) only matter on the secondary level, and letter case on
//! the tertiary level.

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

const COMBINING_ACUTE: char = '\u{0301}';
const COMBINING_RING: char = '\u{030A}';
const COMBINING_CARON: char = '\u{030C}';

const WHITESPACE_WEIGHT: u32 = 1;
const PUNCTUATION_WEIGHT: u32 = 2;
const DIGIT_BASE: u32 = 10;
const LETTER_BASE: u32 = 100;
const OTHER_BASE: u32 = 1_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: Vec<u32>,
    secondary: Vec<u8>,
    tertiary: Vec<u8>,
}

fn letter_weight(letter: char) -> u32 {
    LETTER_BASE + (letter as u32 - 'a' as u32) * 4
}

fn accent_weight(marks: &[char]) -> u8 {
    match marks.first() {
        None => 0,
        Some(&COMBINING_ACUTE) => 1,
        Some(&COMBINING_RING) => 2,
        Some(&COMBINING_CARON) => 3,
        Some(_) => 4,
    }
}

pub fn collation_key(text: &str) -> CollationKey {
    let chars: Vec<char> = text.nfd().collect();
    let mut key = CollationKey::default();
    let mut i = 0;

    while i < chars.len() {
        let base = chars[i];
        i += 1;
        if is_combining_mark(base) {
            continue;
        }

        let mut marks = Vec::new();
        while i < chars.len() && is_combining_mark(chars[i]) {
            marks.push(chars[i]);
            i += 1;
        }

        let is_upper = base.is_uppercase();
        let lower = base.to_lowercase().next().unwrap_or(base);

        let primary = if lower.is_ascii_lowercase() {
            let caron = marks.contains(&COMBINING_CARON);
            if caron && matches!(lower, 'c' | 'r' | 's' | 'z') {
                marks.retain(|m| *m != COMBINING_CARON);
                letter_weight(lower) + 1
            } else if lower == 'c'
                && marks.is_empty()
                && chars.get(i).is_some_and(|next| matches!(next, 'h' | 'H'))
                && !chars.get(i + 1).is_some_and(|after| is_combining_mark(*after))
            {
                i += 1;
                letter_weight('h') + 1
            } else {
                letter_weight(lower)
            }
        } else if lower.is_ascii_digit() {
            DIGIT_BASE + lower.to_digit(10).unwrap_or(0)
        } else if lower.is_whitespace() {
            WHITESPACE_WEIGHT
        } else if lower.is_ascii_punctuation() {
            PUNCTUATION_WEIGHT
        } else {
            OTHER_BASE + lower as u32
        };

        key.primary.push(primary);
        key.secondary.push(accent_weight(&marks));
        key.tertiary.push(u8::from(is_upper));
    }

    key
}

pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}
