//! Deletion guard - refuses to remove objects that still have dependents
//!
//! Wired as a removal subscriber, the guard looks up the dependable view of
//! the object being removed. Objects without the capability, or without
//! dependents, pass; anything else aborts the removal with a
//! `DependencyError`.

use tracing::info;
use crate::Result;
use crate::annotation::AnnotationStore;
use crate::dependable::{DependableLookup, DependableView, Registry};
use crate::event::{RemovalEvent, Subscriber};
use crate::object::ObjectId;
use crate::tree::TreeResolver;

/// Removal of an object that still has dependents
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Removal of object ({object}) which has dependents ({}) is not possible! \
     You must deactivate this object before trying to remove it.",
    .dependents.join(", ")
)]
pub struct DependencyError {
    /// Path of the object being removed
    pub object: String,
    /// Locations still depending on it
    pub dependents: Vec<String>,
}

/// Check one object, given its dependable view if it has one
pub fn check_dependency(
    object: ObjectId,
    view: Option<&dyn DependableView>,
    tree: &dyn TreeResolver,
) -> Result<()> {
    let Some(view) = view else {
        return Ok(());
    };

    let dependents = view.dependents()?;
    if dependents.is_empty() {
        return Ok(());
    }

    let path = tree.path_of(object).unwrap_or_else(|_| object.to_string());
    info!("refusing to remove {}: {} dependents", path, dependents.len());
    Err(DependencyError {
        object: path,
        dependents,
    }
    .into())
}

/// Check the object of a removal event
pub fn check_removal(
    event: &RemovalEvent,
    lookup: &dyn DependableLookup,
    tree: &dyn TreeResolver,
) -> Result<()> {
    let view = lookup.dependable(event.object);
    check_dependency(event.object, view.as_deref(), tree)
}

/// The guard as a removal subscriber over `registry`
pub fn subscriber<'a, S: AnnotationStore + ?Sized + 'a>(registry: Registry<'a, S>) -> Subscriber<'a> {
    Box::new(move |event: &RemovalEvent| check_removal(event, &registry, registry.tree()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::annotation::MemoryAnnotations;
    use crate::event::RemovalEvents;
    use crate::tree::{ObjectTree, ResolveError};

    struct DummyObject;

    impl DependableView for DummyObject {
        fn add_dependent(&self, _: &str) -> Result<()> {
            Ok(())
        }

        fn remove_dependent(&self, _: &str) -> Result<()> {
            Ok(())
        }

        fn dependents(&self) -> Result<Vec<String>> {
            Ok(vec!["dependency1".to_string(), "dependency2".to_string()])
        }
    }

    struct DummyTree;

    impl TreeResolver for DummyTree {
        fn parent_of(&self, _: ObjectId) -> std::result::Result<Option<ObjectId>, ResolveError> {
            Ok(None)
        }

        fn canonical_path(&self, _: ObjectId) -> std::result::Result<String, ResolveError> {
            Ok("/dummy-object".to_string())
        }

        fn path_of(&self, _: ObjectId) -> std::result::Result<String, ResolveError> {
            Ok("/dummy-object".to_string())
        }
    }

    #[test]
    fn test_check_dependency() {
        let err = check_dependency(ObjectId(1), Some(&DummyObject as &dyn DependableView), &DummyTree).unwrap_err();
        match err {
            Error::Dependency(e) => {
                assert_eq!(e.object, "/dummy-object");
                assert_eq!(e.dependents, vec!["dependency1", "dependency2"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_message() {
        let err = DependencyError {
            object: "/dummy-object".to_string(),
            dependents: vec!["dependency1".to_string(), "dependency2".to_string()],
        };
        let message = err.to_string();
        assert!(message.starts_with("Removal of object (/dummy-object) which has dependents (dependency1, dependency2)"));
        assert!(message.contains("deactivate"));
    }

    #[test]
    fn test_without_capability() {
        check_dependency(ObjectId(1), None, &DummyTree).unwrap();
    }

    #[test]
    fn test_without_dependents() {
        let store = MemoryAnnotations::new();
        let tree = ObjectTree::new();
        let item = tree.add_child(ObjectId::root(), "item", true).unwrap();
        let registry = Registry::new(&tree, &store);

        check_removal(&RemovalEvent::new(item, None, "item"), &registry, &tree).unwrap();
    }

    #[test]
    fn test_unlocatable_object_reported_by_id() {
        struct Nowhere;

        impl TreeResolver for Nowhere {
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

        let err = check_dependency(ObjectId(4), Some(&DummyObject as &dyn DependableView), &Nowhere).unwrap_err();
        assert!(matches!(err, Error::Dependency(ref e) if e.object == "#4"));
    }

    #[test]
    fn test_subscriber_vetoes_removal() {
        let store = MemoryAnnotations::new();
        let tree = ObjectTree::new();
        let folder = tree.add_child(ObjectId::root(), "folder", false).unwrap();
        let item = tree.add_child(folder, "item", true).unwrap();
        let user = tree.add_child(folder, "user", false).unwrap();

        let registry = Registry::new(&tree, &store);
        registry.get(item).unwrap().add_dependent("/folder/user").unwrap();

        let mut events = RemovalEvents::new();
        events.subscribe(subscriber(Registry::new(&tree, &store)));

        let err = tree.remove(item, &events, &store).unwrap_err();
        assert!(matches!(err, Error::Dependency(ref e) if e.object == "/folder/item" && e.dependents == vec!["/folder/user"]));
        assert!(tree.contains(item));

        // Removing an ancestor also reaches the dependable object
        assert!(tree.remove(folder, &events, &store).is_err());
        assert!(tree.contains(folder));

        tree.remove(user, &events, &store).unwrap();
        registry.get(item).unwrap().remove_dependent("/folder/user").unwrap();
        tree.remove(folder, &events, &store).unwrap();
        assert!(!tree.contains(item));
        assert!(store.is_empty());
    }
}
