//! Filter stage: narrows a collection by categorical predicates.
//!
//! Active filters compose by logical AND. A filter whose selected value is
//! [`FILTER_ALL`] matches everything. Predicates fail closed: a record whose
//! field is absent (or `null`) is excluded rather than kept.

use super::controls::FILTER_ALL;
use crate::domain::record::{value_text, Record};
use crate::domain::schema::{EntitySchema, FilterSpec};
use std::collections::BTreeMap;

/// Keeps the records that satisfy every active filter, in their original order.
pub fn filter<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    active_filters: &BTreeMap<String, String>,
    schema: &EntitySchema,
) -> Vec<&'a Record> {
    let active: Vec<(&str, &str)> = active_filters
        .iter()
        .filter(|(_, selected)| selected.as_str() != FILTER_ALL)
        .map(|(name, selected)| (name.as_str(), selected.as_str()))
        .collect();

    if active.is_empty() {
        return records.into_iter().collect();
    }

    let specs: Vec<(std::borrow::Cow<'_, FilterSpec>, &str)> = active
        .iter()
        .map(|(name, selected)| (schema.filter_spec(name), *selected))
        .collect();

    records
        .into_iter()
        .filter(|record| specs.iter().all(|(spec, selected)| matches(record, spec, selected)))
        .collect()
}

/// Evaluates a single filter predicate against a record.
#[must_use]
pub fn matches(record: &Record, spec: &FilterSpec, selected: &str) -> bool {
    if selected == FILTER_ALL {
        return true;
    }

    match spec {
        FilterSpec::Equals { field } => match record.resolve(field) {
            None | Some(serde_json::Value::Null) => false,
            Some(value) => value_text(value) == selected,
        },
        FilterSpec::Choice { options } => options.get(selected).is_some_and(|conditions| {
            conditions
                .iter()
                .all(|condition| record.resolve(&condition.field) == Some(&condition.expected))
        }),
    }
}
