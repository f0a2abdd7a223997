//! Dependable - the dependents record of one object
//!
//! `Dependable` binds a `PathSet` to the annotation key holding an object's
//! dependents. The reference prefix is computed once, from the object's
//! parent, when the facade is built. Facades hold no other state: build a
//! new one whenever the object may have moved.

use tracing::{debug, warn};
use crate::Result;
use crate::annotation::AnnotationStore;
use crate::object::ObjectId;
use crate::path::ReferencePrefix;
use crate::pathset::PathSet;
use crate::tree::{ObjectTree, ResolveError, TreeResolver};

/// Annotation key the dependents of an object are stored under
pub const DEPENDENTS_KEY: &str = "dependable.Dependents";

/// Objects that other objects depend on
pub trait DependableView {
    /// Record the location of a dependent object.
    ///
    /// The location is an absolute path, or a path relative to this
    /// object's parent.
    fn add_dependent(&self, location: &str) -> Result<()>;

    /// Forget a dependent location; unknown locations are ignored
    fn remove_dependent(&self, location: &str) -> Result<()>;

    /// Locations of all dependents, as absolute paths where possible
    fn dependents(&self) -> Result<Vec<String>>;
}

/// Capability lookup: the dependable view of an object, if it offers one
pub trait DependableLookup {
    fn dependable(&self, object: ObjectId) -> Option<Box<dyn DependableView + '_>>;
}

/// Dependents record of one object, stored in an annotation store
pub struct Dependable<'a, S: AnnotationStore + ?Sized> {
    object: ObjectId,
    store: &'a S,
    paths: PathSet,
}

impl<'a, S: AnnotationStore + ?Sized> Dependable<'a, S> {
    /// Build the facade for `object` under the default key
    pub fn new(object: ObjectId, tree: &dyn TreeResolver, store: &'a S) -> Self {
        Self::with_key(object, tree, store, DEPENDENTS_KEY)
    }

    /// Build the facade for `object` under a custom annotation key
    pub fn with_key(object: ObjectId, tree: &dyn TreeResolver, store: &'a S, key: &str) -> Self {
        let prefix = reference_prefix(object, tree);
        debug!("{}: reference prefix {:?}", object, prefix.as_str());
        Self::with_prefix(object, store, key, prefix)
    }

    /// Build the facade with an already known reference prefix
    pub fn with_prefix(object: ObjectId, store: &'a S, key: &str, prefix: ReferencePrefix) -> Self {
        Self {
            object,
            store,
            paths: PathSet::new(key, prefix),
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn reference_prefix(&self) -> &ReferencePrefix {
        self.paths.prefix()
    }
}

impl<S: AnnotationStore + ?Sized> DependableView for Dependable<'_, S> {
    fn add_dependent(&self, location: &str) -> Result<()> {
        self.paths.add(self.store, self.object, location)
    }

    fn remove_dependent(&self, location: &str) -> Result<()> {
        self.paths.remove(self.store, self.object, location)
    }

    fn dependents(&self) -> Result<Vec<String>> {
        self.paths.list(self.store, self.object)
    }
}

/// Compute the reference prefix of `object` from its parent.
///
/// Resolution failures yield the empty prefix.
fn reference_prefix(object: ObjectId, tree: &dyn TreeResolver) -> ReferencePrefix {
    let parent = match tree.parent_of(object) {
        Ok(parent) => parent,
        Err(ResolveError::NotSupported) => None,
        Err(e) => {
            warn!("{}: cannot resolve parent, storing absolute paths: {}", object, e);
            None
        }
    };

    let Some(parent) = parent else {
        return ReferencePrefix::none();
    };

    match tree.canonical_path(parent) {
        Ok(path) => ReferencePrefix::from_parent_path(&path),
        Err(e) => {
            warn!("{}: cannot resolve parent path, storing absolute paths: {}", object, e);
            ReferencePrefix::none()
        }
    }
}

/// Dependable capability of the objects of an `ObjectTree`
pub struct Registry<'a, S: AnnotationStore + ?Sized + 'a> {
    tree: &'a ObjectTree,
    store: &'a S,
    key: String,
}

impl<'a, S: AnnotationStore + ?Sized + 'a> Registry<'a, S> {
    pub fn new(tree: &'a ObjectTree, store: &'a S) -> Self {
        Self::with_key(tree, store, DEPENDENTS_KEY)
    }

    pub fn with_key(tree: &'a ObjectTree, store: &'a S, key: impl Into<String>) -> Self {
        Self {
            tree,
            store,
            key: key.into(),
        }
    }

    pub fn tree(&self) -> &'a ObjectTree {
        self.tree
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The dependable facade of `object`, if it offers the capability
    pub fn get(&self, object: ObjectId) -> Option<Dependable<'a, S>> {
        if !self.tree.is_dependable(object) {
            return None;
        }
        Some(Dependable::with_key(object, self.tree, self.store, &self.key))
    }
}

impl<'a, S: AnnotationStore + ?Sized + 'a> DependableLookup for Registry<'a, S> {
    fn dependable(&self, object: ObjectId) -> Option<Box<dyn DependableView + '_>> {
        self.get(object)
            .map(|dependable| Box::new(dependable) as Box<dyn DependableView + '_>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::MemoryAnnotations;

    fn sorted(mut items: Vec<String>) -> Vec<String> {
        items.sort();
        items
    }

    /// A tree answering nothing, like an object that is not locatable
    struct Unlocatable;

    impl TreeResolver for Unlocatable {
        fn parent_of(&self, _: ObjectId) -> std::result::Result<Option<ObjectId>, ResolveError> {
            Err(ResolveError::NotSupported)
        }

        fn canonical_path(&self, _: ObjectId) -> std::result::Result<String, ResolveError> {
            Err(ResolveError::NotSupported)
        }

        fn path_of(&self, _: ObjectId) -> std::result::Result<String, ResolveError> {
            Err(ResolveError::NotSupported)
        }
    }

    #[test]
    fn test_basic() {
        let store = MemoryAnnotations::new();
        let dependable = Dependable::new(ObjectId(1), &Unlocatable, &store);
        assert!(dependable.dependents().unwrap().is_empty());

        dependable.add_dependent("/a/b").unwrap();
        dependable.add_dependent("/c/d").unwrap();
        dependable.add_dependent("/c/e").unwrap();
        dependable.add_dependent("/c/d").unwrap();
        assert_eq!(sorted(dependable.dependents().unwrap()), vec!["/a/b", "/c/d", "/c/e"]);

        dependable.remove_dependent("/c/d").unwrap();
        assert_eq!(sorted(dependable.dependents().unwrap()), vec!["/a/b", "/c/e"]);

        dependable.remove_dependent("/c/d").unwrap();
        assert_eq!(sorted(dependable.dependents().unwrap()), vec!["/a/b", "/c/e"]);
    }

    #[test]
    fn test_relative_absolute() {
        let store = MemoryAnnotations::new();
        let prefix = ReferencePrefix::from_parent_path("/a/");
        let dependable = Dependable::with_prefix(ObjectId(1), &store, DEPENDENTS_KEY, prefix);

        dependable.add_dependent("foo").unwrap();
        assert_eq!(dependable.dependents().unwrap(), vec!["/a/foo"]);
        dependable.remove_dependent("/a/foo").unwrap();
        assert!(dependable.dependents().unwrap().is_empty());

        dependable.add_dependent("/a/bar").unwrap();
        assert_eq!(dependable.dependents().unwrap(), vec!["/a/bar"]);
        dependable.remove_dependent("bar").unwrap();
        assert!(dependable.dependents().unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_no_parent_keeps_paths_as_given() {
        let store = MemoryAnnotations::new();
        let dependable = Dependable::new(ObjectId(1), &Unlocatable, &store);
        assert!(dependable.reference_prefix().is_empty());

        dependable.add_dependent("/x/y").unwrap();
        dependable.add_dependent("relative/z").unwrap();
        assert_eq!(dependable.dependents().unwrap(), vec!["/x/y", "relative/z"]);
    }

    #[test]
    fn test_prefix_from_tree() {
        let tree = ObjectTree::new();
        let store = MemoryAnnotations::new();
        let folder = tree.add_child(ObjectId::root(), "folder", false).unwrap();
        let item = tree.add_child(folder, "item", true).unwrap();

        let dependable = Dependable::new(item, &tree, &store);
        assert_eq!(dependable.reference_prefix().as_str(), "/folder/");
        assert_eq!(dependable.object(), item);

        let top = Dependable::new(folder, &tree, &store);
        assert_eq!(top.reference_prefix().as_str(), "/");

        let root = Dependable::new(ObjectId::root(), &tree, &store);
        assert!(root.reference_prefix().is_empty());
    }

    #[test]
    fn test_unresolvable_parent_path() {
        let tree = ObjectTree::new();
        let store = MemoryAnnotations::new();
        let loose = tree.create_detached("loose", false).unwrap();
        let item = tree.add_child(loose, "item", true).unwrap();

        let dependable = Dependable::new(item, &tree, &store);
        assert!(dependable.reference_prefix().is_empty());

        dependable.add_dependent("/loose/other").unwrap();
        assert_eq!(dependable.dependents().unwrap(), vec!["/loose/other"]);
    }

    #[test]
    fn test_instances_share_the_store() {
        let tree = ObjectTree::new();
        let store = MemoryAnnotations::new();
        let folder = tree.add_child(ObjectId::root(), "folder", false).unwrap();
        let item = tree.add_child(folder, "item", true).unwrap();

        Dependable::new(item, &tree, &store).add_dependent("/folder/user").unwrap();
        let again = Dependable::new(item, &tree, &store);
        assert_eq!(again.dependents().unwrap(), vec!["/folder/user"]);
        assert_eq!(store.get(item, DEPENDENTS_KEY).unwrap(), Some(vec!["user".to_string()]));
    }

    #[test]
    fn test_custom_key() {
        let tree = ObjectTree::new();
        let store = MemoryAnnotations::new();
        let item = tree.add_child(ObjectId::root(), "item", true).unwrap();

        let registry = Registry::with_key(&tree, &store, "custom.Dependents");
        assert_eq!(registry.key(), "custom.Dependents");
        registry.get(item).unwrap().add_dependent("/other").unwrap();

        assert_eq!(store.keys_for(item), vec!["custom.Dependents"]);
        assert!(Dependable::new(item, &tree, &store).dependents().unwrap().is_empty());
    }

    #[test]
    fn test_registry_capability() {
        let tree = ObjectTree::new();
        let store = MemoryAnnotations::new();
        let plain = tree.add_child(ObjectId::root(), "plain", false).unwrap();
        let item = tree.add_child(ObjectId::root(), "item", true).unwrap();
        let registry = Registry::new(&tree, &store);

        assert!(registry.dependable(plain).is_none());
        assert!(registry.dependable(ObjectId(99)).is_none());

        let view = registry.dependable(item).unwrap();
        view.add_dependent("/plain").unwrap();
        assert_eq!(view.dependents().unwrap(), vec!["/plain"]);
        assert_eq!(store.get(item, DEPENDENTS_KEY).unwrap(), Some(vec!["plain".to_string()]));
    }
}
