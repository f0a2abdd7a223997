//! # Dependable - Dependency tracking for hierarchical object trees
//!
//! An object in a tree can record the locations of other objects that
//! depend on it, and refuse to be removed while any remain.
//!
//! Dependable provides:
//! - Path relativization: dependents inside the parent's subtree are stored
//!   relative to it, so moving the subtree keeps the record valid
//! - A `Dependable` facade over a pluggable per-object annotation store
//! - In-memory and SQLite-backed annotation stores
//! - A deletion guard that vetoes removal events for objects with dependents
//! - A reference in-memory object tree with a synchronous removal channel

pub mod object;
pub mod path;
pub mod pathset;
pub mod annotation;
pub mod tree;
pub mod dependable;
pub mod event;
pub mod guard;
pub mod config;
pub mod logging;

// Re-exports for convenient access
pub use object::ObjectId;
pub use path::{ReferencePrefix, canonicalize};
pub use pathset::PathSet;
pub use annotation::{AnnotationStore, MemoryAnnotations, SqliteAnnotations};
pub use tree::{ObjectTree, ResolveError, TreeResolver};
pub use dependable::{DEPENDENTS_KEY, Dependable, DependableLookup, DependableView, Registry};
pub use event::{RemovalEvent, RemovalEvents};
pub use guard::{DependencyError, check_dependency, check_removal};

/// Result type alias for Dependable operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Dependable operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Malformed annotation value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tree error: {0}")]
    Tree(#[from] ResolveError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Dependency(#[from] DependencyError),
}
