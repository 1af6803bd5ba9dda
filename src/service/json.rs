//! JSON file-backed [`RemoteDataService`].
//!
//! Each entity kind lives in its own document, `<dir>/<collection>.json`. The
//! service assigns sequential ids, stamps `createdAt`/`updatedAt` from the
//! injected [`Environment`] clock and writes atomically (temp file + rename)
//! so a crash never leaves a half-written document behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "next_id": 3,
//!   "records": [
//!     { "id": 1, "title": "Dune", "author": "Frank Herbert", "createdAt": "2024-05-01T12:00:00Z" },
//!     { "id": 2, "title": "Emma", "author": "Jane Austen", "createdAt": "2024-05-02T09:30:00Z" }
//!   ]
//! }
//! ```

use super::backend::RemoteDataService;
use crate::domain::error::{FolioError, Result, ValidationError};
use crate::domain::record::{Fields, Record, RecordId, ID_FIELD};
use crate::domain::schema::EntityKind;
use crate::infrastructure::{hex_token, Environment, RandomSource};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const FORMAT_VERSION: u32 = 1;

/// Subdirectory of the data directory holding the collection documents.
const RECORDS_DIR: &str = "records";

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionFile {
    version: u32,
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    records: Vec<Record>,
}

const fn first_id() -> u64 {
    1
}

impl Default for CollectionFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            next_id: first_id(),
            records: Vec::new(),
        }
    }
}

impl CollectionFile {
    /// Raises `next_id` above every numeric id already present.
    fn normalize(&mut self) {
        let highest = self
            .records
            .iter()
            .filter_map(|r| r.id().and_then(|id| id.as_str().parse::<u64>().ok()))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest + 1);
    }

    fn find_mut(&mut self, id: &RecordId) -> Result<&mut Record> {
        self.records
            .iter_mut()
            .find(|r| r.has_id(id))
            .ok_or_else(|| FolioError::NotFound(id.clone()))
    }
}

/// Record service persisting each collection to a JSON document.
///
/// Collections are loaded lazily on first access and cached. Every mutation
/// is applied to a copy, written to disk, and only then committed to the
/// cache, so a failed write leaves both the file and the cache untouched.
#[derive(Debug)]
pub struct JsonFileService {
    dir: PathBuf,
    env: Arc<dyn Environment>,
    random: Arc<dyn RandomSource>,
    collections: Mutex<HashMap<EntityKind, CollectionFile>>,
}

impl JsonFileService {
    /// Opens the service under `<data_dir>/records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(env: Arc<dyn Environment>, random: Arc<dyn RandomSource>) -> Result<Self> {
        let dir = env.data_dir().join(RECORDS_DIR);
        Self::with_dir(dir, env, random)
    }

    /// Opens the service with an explicit document directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_dir(
        dir: impl Into<PathBuf>,
        env: Arc<dyn Environment>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self> {
        let dir = dir.into();
        tracing::debug!(dir = ?dir, "initializing JSON file service");
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            env,
            random,
            collections: Mutex::new(HashMap::new()),
        })
    }

    /// Path of the document holding `kind`.
    #[must_use]
    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.collection_name()))
    }

    /// Replaces the whole collection of `kind`, e.g. to seed a fresh install.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub async fn import(&self, kind: EntityKind, records: Vec<Record>) -> Result<()> {
        let mut data = CollectionFile {
            records,
            ..CollectionFile::default()
        };
        data.normalize();
        self.persist(kind, &data).await?;
        self.collections.lock().await.insert(kind, data);
        tracing::debug!(kind = %kind, "collection imported");
        Ok(())
    }

    fn timestamp(&self) -> Value {
        Value::String(self.env.now().to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    async fn load(&self, kind: EntityKind) -> Result<CollectionFile> {
        let path = self.path_for(kind);
        if !tokio::fs::try_exists(&path).await? {
            tracing::debug!(kind = %kind, "no document yet, starting empty");
            return Ok(CollectionFile::default());
        }

        let contents = tokio::fs::read_to_string(&path).await?;
        let mut data: CollectionFile = serde_json::from_str(&contents).map_err(|e| {
            FolioError::Storage(format!("failed to parse {}: {e}", path.display()))
        })?;
        if data.version > FORMAT_VERSION {
            return Err(FolioError::Storage(format!(
                "unsupported format version {} in {}",
                data.version,
                path.display()
            )));
        }
        data.normalize();

        tracing::debug!(
            kind = %kind,
            version = data.version,
            records = data.records.len(),
            "loaded collection"
        );
        Ok(data)
    }

    async fn persist(&self, kind: EntityKind, data: &CollectionFile) -> Result<()> {
        let path = self.path_for(kind);
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| FolioError::Storage(format!("failed to serialize JSON: {e}")))?;
        let tmp_path = tmp_path_for(&path, &hex_token(self.random.as_ref(), 4));

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        tracing::debug!(path = ?path, records = data.records.len(), "collection saved");
        Ok(())
    }

    /// Runs `change` against a copy of the collection and commits it once the
    /// copy is safely on disk.
    async fn mutate<T>(
        &self,
        kind: EntityKind,
        change: impl FnOnce(&mut CollectionFile) -> Result<T> + Send,
    ) -> Result<T> {
        let mut collections = self.collections.lock().await;
        let current = match collections.get(&kind) {
            Some(data) => data.clone(),
            None => self.load(kind).await?,
        };

        let mut next = current;
        let output = change(&mut next)?;
        self.persist(kind, &next).await?;
        collections.insert(kind, next);
        Ok(output)
    }
}

fn tmp_path_for(path: &Path, token: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{token}.tmp"));
    path.with_file_name(name)
}

#[async_trait]
impl RemoteDataService for JsonFileService {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>> {
        let mut collections = self.collections.lock().await;
        if let Some(data) = collections.get(&kind) {
            return Ok(data.records.clone());
        }
        let data = self.load(kind).await?;
        let records = data.records.clone();
        collections.insert(kind, data);
        Ok(records)
    }

    async fn create(&self, kind: EntityKind, mut fields: Fields) -> Result<Record> {
        let stamp = self.timestamp();
        let record = self
            .mutate(kind, move |data| {
                let id = RecordId::from(data.next_id);
                data.next_id += 1;
                fields.insert(ID_FIELD.to_string(), id.to_value());
                fields.insert(CREATED_AT.to_string(), stamp.clone());
                fields.insert(UPDATED_AT.to_string(), stamp);
                let record = Record::new(fields);
                data.records.push(record.clone());
                Ok(record)
            })
            .await?;

        tracing::debug!(kind = %kind, id = ?record.id(), "record created");
        Ok(record)
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, mut fields: Fields) -> Result<Record> {
        fields.remove(CREATED_AT);
        fields.insert(UPDATED_AT.to_string(), self.timestamp());
        self.mutate(kind, |data| {
            let record = data.find_mut(id)?;
            record.overlay(&fields);
            Ok(record.clone())
        })
        .await
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<()> {
        self.mutate(kind, |data| {
            let before = data.records.len();
            data.records.retain(|r| !r.has_id(id));
            if data.records.len() == before {
                Err(FolioError::NotFound(id.clone()))
            } else {
                Ok(())
            }
        })
        .await?;
        tracing::debug!(kind = %kind, id = %id, "record deleted");
        Ok(())
    }

    async fn set_field(
        &self,
        kind: EntityKind,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<()> {
        if field == ID_FIELD {
            return Err(ValidationError::new(ID_FIELD, "identifier cannot be changed").into());
        }
        let stamp = self.timestamp();
        self.mutate(kind, |data| {
            let record = data.find_mut(id)?;
            record.set(field, value);
            record.set(UPDATED_AT, stamp);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{FixedEnvironment, SeededRandom};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> JsonFileService {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        JsonFileService::new(
            Arc::new(FixedEnvironment::new(dir.path(), now)),
            Arc::new(SeededRandom::new(1)),
        )
        .unwrap()
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn missing_document_lists_empty() {
        let dir = TempDir::new().unwrap();
        let records = service(&dir).list(EntityKind::Book).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_stamps() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let first = service
            .create(EntityKind::Book, fields(json!({"id": 42, "title": "Dune"})))
            .await
            .unwrap();
        let second = service
            .create(EntityKind::Book, fields(json!({"title": "Emma"})))
            .await
            .unwrap();

        assert_eq!(first.id(), Some(RecordId::from(1_u64)));
        assert_eq!(second.id(), Some(RecordId::from(2_u64)));
        assert_eq!(first.text("createdAt"), "2024-05-01T12:00:00Z");
        assert_eq!(first.text("updatedAt"), "2024-05-01T12:00:00Z");
    }

    #[tokio::test]
    async fn data_survives_reopening() {
        let dir = TempDir::new().unwrap();
        {
            let service = service(&dir);
            service
                .create(EntityKind::User, fields(json!({"name": "Ann"})))
                .await
                .unwrap();
        }

        let reopened = service(&dir);
        let users = reopened.list(EntityKind::User).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].text("name"), "Ann");

        let next = reopened
            .create(EntityKind::User, fields(json!({"name": "Bob"})))
            .await
            .unwrap();
        assert_eq!(next.id(), Some(RecordId::from(2_u64)));
    }

    #[tokio::test]
    async fn writes_leave_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service
            .create(EntityKind::CreditPackage, fields(json!({"name": "Starter"})))
            .await
            .unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path().join(RECORDS_DIR))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["credit_packages.json"]);
    }

    #[tokio::test]
    async fn update_and_set_field_report_unknown_ids() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let missing = RecordId::from(9_u64);

        let err = service
            .update(EntityKind::Book, &missing, fields(json!({"title": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::NotFound(_)));

        let err = service
            .set_field(EntityKind::Book, &missing, "isPublished", json!(true))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn set_field_refuses_the_identifier() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let err = service
            .set_field(EntityKind::Book, &RecordId::from(1_u64), "id", json!(2))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn import_then_delete() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let records: Vec<Record> =
            serde_json::from_value(json!([{"id": 4, "name": "a"}, {"id": 7, "name": "b"}])).unwrap();
        service.import(EntityKind::CreditPackage, records).await.unwrap();

        service
            .delete(EntityKind::CreditPackage, &RecordId::from(4_u64))
            .await
            .unwrap();
        let created = service
            .create(EntityKind::CreditPackage, fields(json!({"name": "c"})))
            .await
            .unwrap();

        assert_eq!(created.id(), Some(RecordId::from(8_u64)));
        let names: Vec<String> = service
            .list(EntityKind::CreditPackage)
            .await
            .unwrap()
            .iter()
            .map(|r| r.text("name").into_owned())
            .collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn rejects_documents_from_newer_versions() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        std::fs::write(
            service.path_for(EntityKind::Book),
            r#"{"version": 99, "records": []}"#,
        )
        .unwrap();

        let err = service.list(EntityKind::Book).await.unwrap_err();
        assert!(matches!(err, FolioError::Storage(_)));
    }
}
