//! Annotation stores - per-object keyed values
//!
//! Each object owns an independent mapping from annotation keys to a list
//! of strings. Two backends:
//! - `MemoryAnnotations`: process-local, for tests and transient trees
//! - `SqliteAnnotations`: annotations(owner, key, value) with JSON values

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryAnnotations;
pub use sqlite::SqliteAnnotations;

use crate::Result;
use crate::object::ObjectId;

/// Per-object key-value storage.
///
/// Implementations use interior mutability; every `get` hands out a fresh
/// copy of the stored value.
pub trait AnnotationStore {
    /// Read the value stored under `key`, if any
    fn get(&self, owner: ObjectId, key: &str) -> Result<Option<Vec<String>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, owner: ObjectId, key: &str, value: &[String]) -> Result<()>;

    /// Remove `key`; a missing key is not an error
    fn delete(&self, owner: ObjectId, key: &str) -> Result<()>;

    /// Drop every annotation of `owner`, once the object itself is gone
    fn remove_owner(&self, owner: ObjectId) -> Result<()>;
}
