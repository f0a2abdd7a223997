//! Object tree - hierarchy and path resolution
//!
//! `TreeResolver` is what the dependency machinery needs from a host tree:
//! parents and paths. `ObjectTree` is a small in-memory implementation with
//! rename, move, and guarded removal.

use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;
use crate::{Error, Result};
use crate::annotation::AnnotationStore;
use crate::event::{RemovalEvent, RemovalEvents};
use crate::object::ObjectId;
use crate::path::{SEPARATOR, canonicalize};

/// Why a tree query could not be answered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The object does not take part in the tree
    #[error("object is not part of a tree")]
    NotSupported,

    /// The object is in the tree but its path cannot be computed
    #[error("path not resolvable: {0}")]
    Unresolvable(String),
}

/// Path resolution service of a hierarchical tree
pub trait TreeResolver {
    /// Parent of `object`, `None` for the root or a detached object
    fn parent_of(&self, object: ObjectId) -> std::result::Result<Option<ObjectId>, ResolveError>;

    /// Absolute path of `object` in canonical form
    fn canonical_path(&self, object: ObjectId) -> std::result::Result<String, ResolveError>;

    /// Absolute path of `object`
    fn path_of(&self, object: ObjectId) -> std::result::Result<String, ResolveError>;
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    dependable: bool,
}

#[derive(Debug, Default)]
struct Nodes {
    next_id: u64,
    nodes: HashMap<ObjectId, Node>,
}

impl Nodes {
    fn insert(&mut self, name: &str, parent: Option<ObjectId>, dependable: bool) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            dependable,
        });
        if let Some(parent) = parent
            && let Some(node) = self.nodes.get_mut(&parent)
        {
            node.children.push(id);
        }
        id
    }

    fn detach(&mut self, id: ObjectId) {
        let parent = self.nodes.get_mut(&id).and_then(|node| node.parent.take());
        if let Some(node) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            node.children.retain(|child| *child != id);
        }
    }

    fn is_ancestor(&self, ancestor: ObjectId, mut id: ObjectId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(&id).and_then(|node| node.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

/// In-memory hierarchical object tree.
///
/// The root (`ObjectId::root()`) has path `/`. Objects created with
/// `create_detached` have no path until attached with `move_to`.
#[derive(Debug)]
pub struct ObjectTree {
    inner: RefCell<Nodes>,
}

impl Default for ObjectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTree {
    /// Create a tree holding only the root
    pub fn new() -> Self {
        let mut nodes = Nodes::default();
        nodes.insert("", None, false);
        Self {
            inner: RefCell::new(nodes),
        }
    }

    /// Add a child object under `parent`.
    ///
    /// `dependable` controls whether the object offers the dependable
    /// capability.
    pub fn add_child(&self, parent: ObjectId, name: &str, dependable: bool) -> Result<ObjectId> {
        validate_name(name)?;
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&parent) {
            return Err(ResolveError::NotSupported.into());
        }
        if inner.nodes[&parent].children.iter().any(|c| inner.nodes[c].name == name) {
            return Err(Error::InvalidOperation(format!("{} already has a child named {}", parent, name)));
        }
        Ok(inner.insert(name, Some(parent), dependable))
    }

    /// Create an object outside the tree
    pub fn create_detached(&self, name: &str, dependable: bool) -> Result<ObjectId> {
        validate_name(name)?;
        Ok(self.inner.borrow_mut().insert(name, None, dependable))
    }

    /// Rename an object in place
    pub fn rename(&self, object: ObjectId, name: &str) -> Result<()> {
        validate_name(name)?;
        if object.is_root() {
            return Err(Error::InvalidOperation("cannot rename the root".to_string()));
        }
        let mut inner = self.inner.borrow_mut();
        let parent = inner.nodes.get(&object).ok_or(ResolveError::NotSupported)?.parent;
        if let Some(parent) = parent
            && inner.nodes[&parent].children.iter().any(|c| *c != object && inner.nodes[c].name == name)
        {
            return Err(Error::InvalidOperation(format!("{} already has a child named {}", parent, name)));
        }
        if let Some(node) = inner.nodes.get_mut(&object) {
            node.name = name.to_string();
        }
        Ok(())
    }

    /// Move an object, with its whole subtree, under `new_parent`
    pub fn move_to(&self, object: ObjectId, new_parent: ObjectId) -> Result<()> {
        if object.is_root() {
            return Err(Error::InvalidOperation("cannot move the root".to_string()));
        }
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&object) || !inner.nodes.contains_key(&new_parent) {
            return Err(ResolveError::NotSupported.into());
        }
        if inner.is_ancestor(object, new_parent) {
            return Err(Error::InvalidOperation(format!("cannot move {} into its own subtree", object)));
        }
        let name = inner.nodes[&object].name.clone();
        if inner.nodes[&new_parent].children.iter().any(|c| *c != object && inner.nodes[c].name == name) {
            return Err(Error::InvalidOperation(format!("{} already has a child named {}", new_parent, name)));
        }

        inner.detach(object);
        if let Some(node) = inner.nodes.get_mut(&object) {
            node.parent = Some(new_parent);
        }
        if let Some(node) = inner.nodes.get_mut(&new_parent) {
            node.children.push(object);
        }
        Ok(())
    }

    /// Remove an object and its subtree.
    ///
    /// Subscribers of `events` are notified for the object and each of its
    /// descendants first; if any of them vetoes, the error is returned and
    /// the tree is left unchanged. On success the annotations of every
    /// removed object are dropped from `store` and the removed ids are
    /// returned, the object itself first.
    pub fn remove(
        &self,
        object: ObjectId,
        events: &RemovalEvents<'_>,
        store: &dyn AnnotationStore,
    ) -> Result<Vec<ObjectId>> {
        if object.is_root() {
            return Err(Error::InvalidOperation("cannot remove the root".to_string()));
        }
        // One event per object in the subtree, the object itself first
        let pending_events = {
            let inner = self.inner.borrow();
            if !inner.nodes.contains_key(&object) {
                return Err(ResolveError::NotSupported.into());
            }
            let mut pending_events = Vec::new();
            let mut stack = vec![object];
            while let Some(id) = stack.pop() {
                let node = &inner.nodes[&id];
                pending_events.push(RemovalEvent::new(id, node.parent, node.name.clone()));
                stack.extend(node.children.iter().rev().copied());
            }
            pending_events
        };

        for event in &pending_events {
            events.notify(event)?;
        }

        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner.detach(object);
            let mut removed = Vec::new();
            let mut pending = vec![object];
            while let Some(id) = pending.pop() {
                if let Some(node) = inner.nodes.remove(&id) {
                    pending.extend(node.children);
                    removed.push(id);
                }
            }
            removed
        };

        for id in &removed {
            store.remove_owner(*id)?;
        }
        debug!("removed {} objects under {}", removed.len(), object);
        Ok(removed)
    }

    /// Find an object by absolute path
    pub fn find(&self, path: &str) -> Option<ObjectId> {
        let canonical = canonicalize(path)?;
        let inner = self.inner.borrow();
        let mut current = ObjectId::root();
        for segment in canonical.split(SEPARATOR).filter(|s| !s.is_empty()) {
            current = *inner.nodes[&current]
                .children
                .iter()
                .find(|c| inner.nodes[*c].name == segment)?;
        }
        Some(current)
    }

    /// Name of an object
    pub fn name(&self, object: ObjectId) -> Option<String> {
        self.inner.borrow().nodes.get(&object).map(|node| node.name.clone())
    }

    /// Direct children of an object
    pub fn children(&self, object: ObjectId) -> Vec<ObjectId> {
        self.inner
            .borrow()
            .nodes
            .get(&object)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Whether the object offers the dependable capability
    pub fn is_dependable(&self, object: ObjectId) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(&object)
            .is_some_and(|node| node.dependable)
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.inner.borrow().nodes.contains_key(&object)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().nodes.is_empty()
    }
}

impl TreeResolver for ObjectTree {
    fn parent_of(&self, object: ObjectId) -> std::result::Result<Option<ObjectId>, ResolveError> {
        self.inner
            .borrow()
            .nodes
            .get(&object)
            .map(|node| node.parent)
            .ok_or(ResolveError::NotSupported)
    }

    fn canonical_path(&self, object: ObjectId) -> std::result::Result<String, ResolveError> {
        let path = self.path_of(object)?;
        Ok(canonicalize(&path).unwrap_or(path))
    }

    fn path_of(&self, object: ObjectId) -> std::result::Result<String, ResolveError> {
        let inner = self.inner.borrow();
        let mut names = Vec::new();
        let mut current = object;
        loop {
            if current.is_root() {
                break;
            }
            let node = inner
                .nodes
                .get(&current)
                .ok_or_else(|| ResolveError::Unresolvable(format!("{} is not in the tree", current)))?;
            names.push(node.name.as_str());
            current = node
                .parent
                .ok_or_else(|| ResolveError::Unresolvable(format!("{} is detached", object)))?;
        }

        if names.is_empty() {
            return Ok(SEPARATOR.to_string());
        }
        names.reverse();
        Ok(names.iter().fold(String::new(), |mut path, name| {
            path.push(SEPARATOR);
            path.push_str(name);
            path
        }))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(SEPARATOR) {
        return Err(Error::InvalidOperation(format!("invalid object name: {:?}", name)));
    }
    Ok(())
}
