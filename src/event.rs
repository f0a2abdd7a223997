//! Removal events - synchronous "about to be removed" notifications
//!
//! Subscribers run in registration order. The first one to return an error
//! vetoes the removal; later subscribers are not called.

use crate::Result;
use crate::object::ObjectId;

/// An object is about to be removed from the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalEvent {
    /// The object being removed
    pub object: ObjectId,
    /// Its parent before removal
    pub parent: Option<ObjectId>,
    /// Its name before removal
    pub name: String,
}

impl RemovalEvent {
    pub fn new(object: ObjectId, parent: Option<ObjectId>, name: impl Into<String>) -> Self {
        Self {
            object,
            parent,
            name: name.into(),
        }
    }
}

/// A removal subscriber; returning an error vetoes the removal
pub type Subscriber<'a> = Box<dyn Fn(&RemovalEvent) -> Result<()> + 'a>;

/// Subscribers to removal events
#[derive(Default)]
pub struct RemovalEvents<'a> {
    subscribers: Vec<Subscriber<'a>>,
}

impl<'a> RemovalEvents<'a> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber<'a>) {
        self.subscribers.push(subscriber);
    }

    /// Deliver `event` to every subscriber, stopping at the first veto
    pub fn notify(&self, event: &RemovalEvent) -> Result<()> {
        for subscriber in &self.subscribers {
            subscriber(event)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
