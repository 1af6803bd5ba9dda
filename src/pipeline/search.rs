//! Search stage: narrows a collection by free-text query.
//!
//! The default mode is a case-insensitive substring match of the trimmed query
//! against any of the configured target fields. Fuzzy mode uses the skim
//! matcher and requires every whitespace-separated token to match some field.
//! Missing fields are searched as empty strings.

use crate::domain::error::FolioError;
use crate::domain::record::Record;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the search query is matched against record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Substring,
    Fuzzy,
}

impl FromStr for SearchMode {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" | "contains" => Ok(Self::Substring),
            "fuzzy" => Ok(Self::Fuzzy),
            other => Err(FolioError::Config(format!("unknown search mode: {other}"))),
        }
    }
}

/// Keeps the records matching `query`, in their original order.
///
/// An empty or whitespace-only query returns the input unchanged.
pub fn search<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    query: &str,
    fields: &[String],
    mode: SearchMode,
) -> Vec<&'a Record> {
    let query = query.trim();
    if query.is_empty() {
        return records.into_iter().collect();
    }

    let _span = tracing::debug_span!("search", query_len = query.len(), mode = ?mode).entered();

    match mode {
        SearchMode::Substring => {
            let needle = query.to_lowercase();
            records
                .into_iter()
                .filter(|record| {
                    fields
                        .iter()
                        .any(|field| record.text(field).to_lowercase().contains(&needle))
                })
                .collect()
        }
        SearchMode::Fuzzy => {
            let matcher = SkimMatcherV2::default();
            let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
            records
                .into_iter()
                .filter(|record| {
                    let haystacks: Vec<String> = fields
                        .iter()
                        .map(|field| record.text(field).to_lowercase())
                        .collect();
                    tokens.iter().all(|token| {
                        haystacks
                            .iter()
                            .any(|haystack| matcher.fuzzy_match(haystack, token).is_some())
                    })
                })
                .collect()
        }
    }
}

/// Character ranges of `text` matched by `query`, for highlighting.
///
/// Ranges are `(start, end)` char indices with an exclusive end, coalesced so
/// that consecutive matched characters form a single range. In fuzzy mode each
/// query token is matched on its own and the results are merged.
#[must_use]
pub fn highlight_ranges(text: &str, query: &str, mode: SearchMode) -> Vec<(usize, usize)> {
    let query = query.trim();
    if query.is_empty() || text.is_empty() {
        return Vec::new();
    }

    match mode {
        SearchMode::Substring => substring_ranges(text, query),
        SearchMode::Fuzzy => {
            let matcher = SkimMatcherV2::default();
            let mut indices: Vec<usize> = query
                .split_whitespace()
                .filter_map(|token| matcher.fuzzy_indices(text, &token.to_lowercase()))
                .flat_map(|(_score, indices)| indices)
                .collect();
            indices.sort_unstable();
            indices.dedup();
            coalesce(&indices)
        }
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn substring_ranges(text: &str, query: &str) -> Vec<(usize, usize)> {
    let haystack: Vec<char> = text.chars().map(fold).collect();
    let needle: Vec<char> = query.chars().map(fold).collect();
    let mut ranges = Vec::new();
    if needle.len() > haystack.len() {
        return ranges;
    }

    let mut start = 0;
    while start + needle.len() <= haystack.len() {
        if haystack[start..start + needle.len()] == needle[..] {
            ranges.push((start, start + needle.len()));
            start += needle.len();
        } else {
            start += 1;
        }
    }
    ranges
}

fn coalesce(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}
