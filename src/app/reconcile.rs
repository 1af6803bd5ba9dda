//! Mutation reconciler: patches the collection after a confirmed remote write.
//!
//! Reconciliation only ever runs with a result the service has already
//! confirmed. A failed remote call produces no [`Mutation`] at all, so the
//! collection is never left holding an optimistic edit.

use crate::domain::record::{Record, RecordId};
use serde_json::Value;

/// A confirmed remote write, expressed as the change to apply locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// The service created this record and assigned its id.
    Created(Record),
    /// The service returned the authoritative state of an updated record.
    Updated(Record),
    Deleted(RecordId),
    /// A single field changed; every other field is untouched.
    FieldSet {
        id: RecordId,
        field: String,
        value: Value,
    },
}

impl Mutation {
    /// Identifier of the record this mutation targets.
    #[must_use]
    pub fn target(&self) -> Option<RecordId> {
        match self {
            Self::Created(record) | Self::Updated(record) => record.id(),
            Self::Deleted(id) | Self::FieldSet { id, .. } => Some(id.clone()),
        }
    }
}

/// Result of applying a [`Mutation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The collection changed.
    Applied,
    /// The target is not in the collection; nothing changed.
    Stale,
}

/// Applies a confirmed mutation to `collection` in place.
///
/// Created records are appended, or replace an existing record with the same
/// id so the collection never holds duplicates. Updates overlay the returned
/// fields onto the matching record. Deletes and field sets that match nothing
/// are no-ops reported as [`Reconciled::Stale`].
pub fn reconcile(collection: &mut Vec<Record>, mutation: &Mutation) -> Reconciled {
    let _span = tracing::debug_span!("reconcile", target = ?mutation.target(), size = collection.len()).entered();

    let outcome = match mutation {
        Mutation::Created(record) => match record.id() {
            Some(id) => {
                if let Some(existing) = find_mut(collection, &id) {
                    tracing::debug!(id = %id, "created record already present, replacing");
                    existing.clone_from(record);
                } else {
                    collection.push(record.clone());
                }
                Reconciled::Applied
            }
            None => {
                tracing::warn!("created record carries no id, skipping");
                Reconciled::Stale
            }
        },
        Mutation::Updated(record) => match record.id() {
            Some(id) => match find_mut(collection, &id) {
                Some(existing) => {
                    existing.overlay(record.fields());
                    Reconciled::Applied
                }
                None => Reconciled::Stale,
            },
            None => Reconciled::Stale,
        },
        Mutation::Deleted(id) => {
            let before = collection.len();
            collection.retain(|record| !record.has_id(id));
            if collection.len() == before {
                Reconciled::Stale
            } else {
                Reconciled::Applied
            }
        }
        Mutation::FieldSet { id, field, value } => match find_mut(collection, id) {
            Some(existing) => {
                existing.set(field.clone(), value.clone());
                Reconciled::Applied
            }
            None => Reconciled::Stale,
        },
    };

    tracing::debug!(outcome = ?outcome, size = collection.len(), "mutation reconciled");
    outcome
}

fn find_mut<'a>(collection: &'a mut [Record], id: &RecordId) -> Option<&'a mut Record> {
    collection.iter_mut().find(|record| record.has_id(id))
}
