//! In-memory annotation store

use std::cell::RefCell;
use std::collections::HashMap;
use crate::Result;
use crate::object::ObjectId;
use super::AnnotationStore;

/// Annotation store kept in a process-local map
#[derive(Debug, Default)]
pub struct MemoryAnnotations {
    values: RefCell<HashMap<(ObjectId, String), Vec<String>>>,
}

impl MemoryAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently annotated on `owner`, sorted
    pub fn keys_for(&self, owner: ObjectId) -> Vec<String> {
        let mut keys: Vec<String> = self
            .values
            .borrow()
            .keys()
            .filter(|(o, _)| *o == owner)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl AnnotationStore for MemoryAnnotations {
    fn get(&self, owner: ObjectId, key: &str) -> Result<Option<Vec<String>>> {
        Ok(self.values.borrow().get(&(owner, key.to_string())).cloned())
    }

    fn set(&self, owner: ObjectId, key: &str, value: &[String]) -> Result<()> {
        self.values
            .borrow_mut()
            .insert((owner, key.to_string()), value.to_vec());
        Ok(())
    }

    fn delete(&self, owner: ObjectId, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(&(owner, key.to_string()));
        Ok(())
    }

    fn remove_owner(&self, owner: ObjectId) -> Result<()> {
        self.values.borrow_mut().retain(|(o, _), _| *o != owner);
        Ok(())
    }
}
