//! Domain layer: records, entity schemas, validation rules and errors.
//!
//! Everything here is independent of how records are fetched or displayed.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`record`]: The generic [`Record`] and its identifier
//! - [`schema`]: Entity kinds and their pipeline schemas
//! - [`validation`]: Form validation for create and edit modals
//!
//! # Examples
//!
//! ```
//! use folio::domain::{EntityKind, Record};
//! use serde_json::json;
//!
//! let book = Record::from_json(json!({"id": 1, "title": "Dune"}))?;
//! let schema = EntityKind::Book.schema();
//! assert_eq!(book.text(&schema.title_field), "Dune");
//! # Ok::<(), folio::FolioError>(())
//! ```

pub mod error;
pub mod record;
pub mod schema;
pub mod validation;

pub use error::{FolioError, Result, ValidationError};
pub use record::{Fields, Record, RecordId, ID_FIELD};
pub use schema::{Condition, EntityKind, EntitySchema, FilterSpec, SortField, SortKind};
pub use validation::{validate, FormInput, FormIntent};
