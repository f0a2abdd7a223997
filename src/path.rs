//! Tree paths - canonical form and reference prefixes
//!
//! Paths use `/` as the separator. Absolute paths start with `/`, anything
//! else is relative. Canonical form:
//!
//! - `/a//b/./c/` → `/a/b/c`
//! - `/a/b/../c` → `/a/c`
//! - `/` → `/`
//!
//! A path that climbs above the root has no canonical form.

use std::fmt;

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Whether `path` is absolute (starts at the tree root)
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Canonicalize an absolute path.
///
/// Returns `None` for relative or empty input and for paths whose `..`
/// segments climb above the root.
pub fn canonicalize(path: &str) -> Option<String> {
    if !is_absolute(path) {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            name => segments.push(name),
        }
    }

    let mut canonical = String::with_capacity(path.len());
    if segments.is_empty() {
        canonical.push(SEPARATOR);
    }
    for segment in segments {
        canonical.push(SEPARATOR);
        canonical.push_str(segment);
    }
    Some(canonical)
}

/// Path of a dependable object's parent, used to store dependents compactly.
///
/// Always empty or ending with exactly one `/`. An empty prefix means
/// dependents are stored exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ReferencePrefix(String);

impl ReferencePrefix {
    /// The empty prefix (no parent, or the parent could not be resolved)
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Build a prefix from the parent's canonical path
    pub fn from_parent_path(path: &str) -> Self {
        let mut prefix = path.to_string();
        if !prefix.ends_with(SEPARATOR) {
            prefix.push(SEPARATOR);
        }
        Self(prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ReferencePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
