//! PathSet - relativizing set of tree paths stored under one annotation key
//!
//! Paths are kept in two forms:
//! - **storage form**: relative to the reference prefix when the path lies
//!   below it, otherwise absolute (or whatever the caller passed in)
//! - **presentation form**: always absolute when a prefix is known
//!
//! With prefix `/site/folder/`:
//! - `/site/folder/user` is stored as `user`
//! - `/elsewhere/x` is stored as `/elsewhere/x`
//! - `user` is presented as `/site/folder/user`
//!
//! Relative entries follow the subtree when it moves. Every mutation also
//! re-normalizes the entries already stored against the current prefix, so
//! entries written before a move collapse onto their relative form instead
//! of lingering as duplicates.

use tracing::debug;
use crate::Result;
use crate::annotation::AnnotationStore;
use crate::object::ObjectId;
use crate::path::{ReferencePrefix, canonicalize, is_absolute};

/// A set of paths stored relative to a reference prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    key: String,
    prefix: ReferencePrefix,
}

impl PathSet {
    pub fn new(key: impl Into<String>, prefix: ReferencePrefix) -> Self {
        Self {
            key: key.into(),
            prefix,
        }
    }

    /// Annotation key the set is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn prefix(&self) -> &ReferencePrefix {
        &self.prefix
    }

    /// Convert a path to the form it is persisted in.
    ///
    /// Only absolute paths are rewritten, and only when a prefix is known.
    /// A path with no canonical form is kept verbatim.
    pub fn to_storage_form(&self, path: &str) -> String {
        if !is_absolute(path) || self.prefix.is_empty() {
            return path.to_string();
        }

        let Some(canonical) = canonicalize(path) else {
            return path.to_string();
        };

        match canonical.strip_prefix(self.prefix.as_str()) {
            // Canonical paths never carry a leading separator past the
            // prefix; older stored data may.
            Some(rest) => rest.trim_start_matches('/').to_string(),
            None => canonical,
        }
    }

    /// Convert a stored path to the absolute form handed to callers
    pub fn to_presentation_form(&self, path: &str) -> String {
        if !is_absolute(path) && !self.prefix.is_empty() {
            format!("{}{}", self.prefix, path)
        } else {
            path.to_string()
        }
    }

    /// Re-normalize stored entries against the current prefix.
    ///
    /// Entries that collapse onto the same storage form keep only their
    /// first occurrence.
    pub fn normalize(&self, stored: &[String]) -> Vec<String> {
        let mut fixed: Vec<String> = Vec::with_capacity(stored.len());
        for entry in stored {
            let healed = self.to_storage_form(entry);
            if healed != *entry {
                debug!("{}: healed stale entry {:?} -> {:?}", self.key, entry, healed);
            }
            if !fixed.contains(&healed) {
                fixed.push(healed);
            }
        }
        fixed
    }

    /// The stored set with `path` added
    pub fn with_path(&self, stored: &[String], path: &str) -> Vec<String> {
        let path = self.to_storage_form(path);
        let mut fixed = self.normalize(stored);
        if !fixed.contains(&path) {
            fixed.push(path);
        }
        fixed
    }

    /// The stored set with `path` removed
    pub fn without_path(&self, stored: &[String], path: &str) -> Vec<String> {
        let path = self.to_storage_form(path);
        self.normalize(stored)
            .into_iter()
            .filter(|entry| *entry != path)
            .collect()
    }

    /// Add `path` to the set owned by `owner`
    pub fn add<S: AnnotationStore + ?Sized>(&self, store: &S, owner: ObjectId, path: &str) -> Result<()> {
        let old = store.get(owner, &self.key)?.unwrap_or_default();
        let new = self.with_path(&old, path);
        if new != old {
            debug!("{}: {} -> {:?}", owner, self.key, new);
            store.set(owner, &self.key, &new)?;
        }
        Ok(())
    }

    /// Remove `path` from the set owned by `owner`.
    ///
    /// Removing the last entry deletes the key.
    pub fn remove<S: AnnotationStore + ?Sized>(&self, store: &S, owner: ObjectId, path: &str) -> Result<()> {
        let old = store.get(owner, &self.key)?.unwrap_or_default();
        if old.is_empty() {
            return Ok(());
        }

        let new = self.without_path(&old, path);
        if new == old {
            return Ok(());
        }

        if new.is_empty() {
            debug!("{}: {} emptied, deleting", owner, self.key);
            store.delete(owner, &self.key)
        } else {
            debug!("{}: {} -> {:?}", owner, self.key, new);
            store.set(owner, &self.key, &new)
        }
    }

    /// All paths in the set, in presentation form
    pub fn list<S: AnnotationStore + ?Sized>(&self, store: &S, owner: ObjectId) -> Result<Vec<String>> {
        let stored = store.get(owner, &self.key)?.unwrap_or_default();
        Ok(stored.iter().map(|p| self.to_presentation_form(p)).collect())
    }
}
