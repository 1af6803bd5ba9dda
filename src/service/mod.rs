//! Record services: the remote side of every list screen.
//!
//! - [`backend`]: The [`RemoteDataService`] trait
//! - [`json`]: JSON documents on disk, one per entity kind
//! - [`memory`]: In-memory collections with scriptable failures

pub mod backend;
pub mod json;
pub mod memory;

pub use backend::RemoteDataService;
pub use json::JsonFileService;
pub use memory::{MemoryService, Operation};
