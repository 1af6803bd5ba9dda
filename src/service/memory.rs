//! In-memory [`RemoteDataService`] with scriptable failures.
//!
//! Keeps every collection in a `tokio` mutex, counts calls per operation and
//! can be told to fail a given operation with a transport error. Integration
//! tests and demos use it in place of a real backend.

use super::backend::RemoteDataService;
use crate::domain::error::{FolioError, Result};
use crate::domain::record::{Fields, Record, RecordId, ID_FIELD};
use crate::domain::schema::EntityKind;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

/// Service operations, used to script failures and read call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    SetField,
}

#[derive(Debug, Default)]
pub struct MemoryService {
    collections: tokio::sync::Mutex<HashMap<EntityKind, Vec<Record>>>,
    failures: Mutex<HashMap<Operation, String>>,
    calls: Mutex<HashMap<Operation, usize>>,
    delay: Duration,
}

impl MemoryService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the collection of `kind`.
    #[must_use]
    pub fn with_records(mut self, kind: EntityKind, records: Vec<Record>) -> Self {
        self.collections.get_mut().insert(kind, records);
        self
    }

    /// Delays every call, simulating network latency.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes every subsequent `operation` fail with a transport error.
    pub fn fail(&self, operation: Operation, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation, message.into());
    }

    /// Clears a failure scripted with [`fail`](Self::fail).
    pub fn recover(&self, operation: Operation) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&operation);
    }

    /// Number of times `operation` has been called, failed calls included.
    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Current server-side contents of `kind`.
    pub async fn snapshot(&self, kind: EntityKind) -> Vec<Record> {
        self.collections
            .lock()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    async fn enter(&self, operation: Operation) -> Result<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation)
            .or_insert(0) += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&operation)
            .cloned();
        match failure {
            Some(message) => {
                tracing::debug!(operation = ?operation, %message, "scripted failure");
                Err(FolioError::Transport(message))
            }
            None => Ok(()),
        }
    }
}

fn next_id(records: &[Record]) -> u64 {
    records
        .iter()
        .filter_map(|r| r.id().and_then(|id| id.as_str().parse::<u64>().ok()))
        .max()
        .unwrap_or(0)
        + 1
}

#[async_trait]
impl RemoteDataService for MemoryService {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>> {
        self.enter(Operation::List).await?;
        let records = self.snapshot(kind).await;
        tracing::debug!(kind = %kind, count = records.len(), "records listed");
        Ok(records)
    }

    async fn create(&self, kind: EntityKind, mut fields: Fields) -> Result<Record> {
        self.enter(Operation::Create).await?;

        let mut collections = self.collections.lock().await;
        let records = collections.entry(kind).or_default();
        let id = RecordId::from(next_id(records));
        fields.insert(ID_FIELD.to_string(), id.to_value());
        let record = Record::new(fields);
        records.push(record.clone());

        tracing::debug!(kind = %kind, id = %id, "record created");
        Ok(record)
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, fields: Fields) -> Result<Record> {
        self.enter(Operation::Update).await?;

        let mut collections = self.collections.lock().await;
        let record = collections
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|r| r.has_id(id)))
            .ok_or_else(|| FolioError::NotFound(id.clone()))?;
        record.overlay(&fields);
        Ok(record.clone())
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()> {
        self.enter(Operation::Delete).await?;

        let mut collections = self.collections.lock().await;
        let records = collections.entry(kind).or_default();
        let before = records.len();
        records.retain(|r| !r.has_id(id));
        if records.len() == before {
            return Err(FolioError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn set_field(
        &self,
        kind: EntityKind,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<()> {
        self.enter(Operation::SetField).await?;

        let mut collections = self.collections.lock().await;
        let record = collections
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|r| r.has_id(id)))
            .ok_or_else(|| FolioError::NotFound(id.clone()))?;
        record.set(field, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn packages() -> Vec<Record> {
        serde_json::from_value(json!([
            {"id": 4, "name": "Starter", "isActive": true},
            {"id": 5, "name": "Reader", "isActive": true}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn create_assigns_the_next_numeric_id() {
        let service = MemoryService::new().with_records(EntityKind::CreditPackage, packages());
        let mut fields = Fields::new();
        fields.insert("name".into(), json!("Bulk"));

        let created = service.create(EntityKind::CreditPackage, fields).await.unwrap();
        assert_eq!(created.id(), Some(RecordId::from(6_u64)));
        assert_eq!(service.snapshot(EntityKind::CreditPackage).await.len(), 3);
    }

    #[tokio::test]
    async fn scripted_failures_count_calls_and_leave_data_alone() {
        let service = MemoryService::new().with_records(EntityKind::CreditPackage, packages());
        service.fail(Operation::SetField, "connection reset");

        let err = service
            .set_field(EntityKind::CreditPackage, &RecordId::from(5_u64), "isActive", json!(false))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Transport(ref m) if m == "connection reset"));
        assert_eq!(service.call_count(Operation::SetField), 1);
        assert_eq!(service.snapshot(EntityKind::CreditPackage).await, packages());

        service.recover(Operation::SetField);
        service
            .set_field(EntityKind::CreditPackage, &RecordId::from(5_u64), "isActive", json!(false))
            .await
            .unwrap();
        assert_eq!(service.total_calls(), 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let service = MemoryService::new().with_records(EntityKind::CreditPackage, packages());
        let err = service
            .delete(EntityKind::CreditPackage, &RecordId::from(99_u64))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_overlays_fields_and_keeps_the_id() {
        let service = MemoryService::new().with_records(EntityKind::CreditPackage, packages());
        let mut fields = Fields::new();
        fields.insert("id".into(), json!(77));
        fields.insert("name".into(), json!("Reader+"));

        let updated = service
            .update(EntityKind::CreditPackage, &RecordId::from(5_u64), fields)
            .await
            .unwrap();
        assert_eq!(updated.id(), Some(RecordId::from(5_u64)));
        assert_eq!(updated.text("name"), "Reader+");
        assert_eq!(updated.get("isActive"), Some(&json!(true)));
    }
}
