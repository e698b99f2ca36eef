//! Best-effort PII redaction for extracted cells.
//!
//! Each class (email, card number, phone number) is matched independently
//! anywhere in the cell, so narrative text with an embedded address still
//! gets masked. Shapes are matched, nothing is validated.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::extractor::ExtractedTable;

pub const PHONE_MASK: &str = "###-###-####";
pub const CARD_MASK: &str = "****-****-****-****";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // local first char, domain first char, last dotted suffix
    Regex::new(r"\b([A-Za-z0-9._%+-])[A-Za-z0-9._%+-]*@([A-Za-z0-9])[A-Za-z0-9.-]*(\.[A-Za-z]{2,})\b")
        .expect("invalid email regex")
});

static DIGIT_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // whole digit runs, optionally grouped with single spaces or dashes
    Regex::new(r"\b\d(?:[ -]?\d)*\b").expect("invalid digit run regex")
});

const CARD_DIGITS: std::ops::RangeInclusive<usize> = 13..=16;

static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // (415) 555-0100, 415-555-0100, +1 415 555 0100, 415.555.0100, 4155550100
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b")
        .expect("invalid phone regex")
});

/// Mask every email, card-like and phone-like substring of `text`.
pub fn mask(text: &str) -> String {
    let masked = EMAIL_REGEX.replace_all(text, "${1}***@${2}***${3}");

    // Cards before phones: a 16 digit run contains phone-shaped substrings.
    let masked = DIGIT_RUN_REGEX.replace_all(&masked, |caps: &Captures| {
        let run = &caps[0];
        if is_card_run(run) {
            CARD_MASK.to_string()
        } else {
            run.to_string()
        }
    });

    PHONE_REGEX.replace_all(&masked, PHONE_MASK).into_owned()
}

fn is_card_run(run: &str) -> bool {
    CARD_DIGITS.contains(&run.chars().filter(char::is_ascii_digit).count())
}

pub fn contains_pii(text: &str) -> bool {
    EMAIL_REGEX.is_match(text)
        || DIGIT_RUN_REGEX.find_iter(text).any(|m| is_card_run(m.as_str()))
        || PHONE_REGEX.is_match(text)
}

/// Mask every cell of a row matrix.
pub fn process_dataset(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| mask(cell)).collect())
        .collect()
}

impl ExtractedTable {
    /// Copy of the table with headers and rows passed through [`mask`].
    pub fn anonymized(&self) -> ExtractedTable {
        ExtractedTable {
            headers: self.headers.iter().map(|h| mask(h)).collect(),
            rows: process_dataset(&self.rows),
        }
    }
}
