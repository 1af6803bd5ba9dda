//! Sort stage: orders a collection by a typed sort key.
//!
//! The sort is stable in both directions. Descending order reverses the
//! comparator rather than the output, so records with equal keys keep their
//! original relative order either way.

use super::controls::SortDirection;
use crate::domain::record::Record;
use crate::domain::schema::{SortField, SortKind};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Returns `records` ordered by `field` in `direction`.
pub fn sort<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    field: &SortField,
    direction: SortDirection,
) -> Vec<&'a Record> {
    let mut sorted: Vec<&'a Record> = records.into_iter().collect();

    let _span = tracing::debug_span!("sort",
        path = %field.path,
        kind = ?field.kind,
        direction = ?direction,
        count = sorted.len()
    )
    .entered();

    match direction {
        SortDirection::Ascending => sorted.sort_by(|a, b| compare(a, b, field)),
        SortDirection::Descending => sorted.sort_by(|a, b| compare(b, a, field)),
    }
    sorted
}

/// Compares two records on a sort field.
#[must_use]
pub fn compare(a: &Record, b: &Record, field: &SortField) -> Ordering {
    match field.kind {
        SortKind::Text => compare_text(&a.text(&field.path), &b.text(&field.path)),
        SortKind::Number => a
            .number(&field.path)
            .partial_cmp(&b.number(&field.path))
            .unwrap_or(Ordering::Equal),
    }
}

/// Locale-style text comparison.
///
/// Strings compare on their base letters first, ignoring case and accents,
/// so `"Émile"` sorts between `"Dune"` and `"Eve"`. Letters with a stroke
/// that Unicode does not decompose (`đ`, `ł`, `ø`) sort right after their
/// plain letter, as in Vietnamese. Remaining ties are broken by accents, then
/// by case with the lowercase form first.
#[must_use]
pub fn compare_text(a: &str, b: &str) -> Ordering {
    CollationKey::new(a)
        .cmp(&CollationKey::new(b))
        .then_with(|| b.cmp(a))
}

/// Sort key for [`compare_text`]: base letter weights, then the combining
/// marks attached to each letter.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    letters: Vec<u32>,
    accents: Vec<String>,
}

impl CollationKey {
    fn new(text: &str) -> Self {
        let mut letters = Vec::with_capacity(text.len());
        let mut accents: Vec<String> = Vec::with_capacity(text.len());

        for c in text.nfd() {
            if is_combining_mark(c) {
                if let Some(marks) = accents.last_mut() {
                    marks.push(c);
                }
                continue;
            }
            for lower in c.to_lowercase() {
                letters.push(letter_weight(lower));
                accents.push(String::new());
            }
        }

        Self { letters, accents }
    }
}

fn letter_weight(c: char) -> u32 {
    let (base, offset) = match c {
        'đ' => ('d', 1),
        'ł' => ('l', 1),
        'ø' => ('o', 1),
        other => (other, 0),
    };
    u32::from(base) * 2 + offset
}
