//! Remote data service abstraction.
//!
//! [`RemoteDataService`] is the boundary between a list screen and whatever
//! actually stores records. The screen never mutates its collection until a
//! call on this trait has returned successfully.

use crate::domain::error::Result;
use crate::domain::record::{Fields, Record, RecordId};
use crate::domain::schema::EntityKind;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Asynchronous, fallible access to the records of every entity kind.
///
/// Errors are reported as [`FolioError::Transport`](crate::FolioError::Transport)
/// when the call could not be delivered or was rejected,
/// [`FolioError::Validation`](crate::FolioError::Validation) when the service
/// refused the payload, and [`FolioError::NotFound`](crate::FolioError::NotFound)
/// when the target id is unknown.
///
/// # Implementations
///
/// - [`JsonFileService`](super::JsonFileService): one JSON document per kind
/// - [`MemoryService`](super::MemoryService): in-memory, scriptable failures
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    /// Returns every record of `kind`.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>>;

    /// Creates a record and returns it with its server-assigned id.
    async fn create(&self, kind: EntityKind, fields: Fields) -> Result<Record>;

    /// Updates a record and returns its authoritative new state.
    async fn update(&self, kind: EntityKind, id: &RecordId, fields: Fields) -> Result<Record>;

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()>;

    /// Changes one field of one record, typically a boolean toggle.
    async fn set_field(
        &self,
        kind: EntityKind,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<()>;
}

#[async_trait]
impl<S: RemoteDataService + ?Sized> RemoteDataService for Arc<S> {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>> {
        (**self).list(kind).await
    }

    async fn create(&self, kind: EntityKind, fields: Fields) -> Result<Record> {
        (**self).create(kind, fields).await
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, fields: Fields) -> Result<Record> {
        (**self).update(kind, id, fields).await
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()> {
        (**self).delete(kind, id).await
    }

    async fn set_field(
        &self,
        kind: EntityKind,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<()> {
        (**self).set_field(kind, id, field, value).await
    }
}
