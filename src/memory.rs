//! In-memory platform pieces: a storage area shared by simulated browsing
//! contexts, a class list target and a manually drained scheduler.
//!
//! They mirror browser semantics closely enough to drive the engine outside
//! a browser, including the rule that a storage write is announced to every
//! context except the one that made it.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::applier::{ClassTarget, Scheduler};
use crate::error::StorageError;
use crate::listeners::Listeners;
use crate::storage::StorageBackend;
use crate::subscription::Subscription;
use crate::sync::{StorageChange, StorageEvents};

type ContextId = u64;

struct ContextListener {
    context: ContextId,
    callback: Rc<dyn Fn(&StorageChange)>,
}

struct StorageArea {
    items: RefCell<BTreeMap<String, String>>,
    listeners: RefCell<Listeners<ContextListener>>,
    next_context: Cell<ContextId>,
    available: Cell<bool>,
}

impl StorageArea {
    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.get() {
            Ok(())
        } else {
            Err(StorageError::Unavailable("storage is disabled".to_string()))
        }
    }

    fn broadcast(&self, writer: ContextId, change: StorageChange) {
        let listeners = self.listeners.borrow().snapshot();
        for (_, listener) in listeners {
            if listener.context != writer {
                (listener.callback)(&change);
            }
        }
    }
}

/// Handle to one browsing context's view of a shared storage area.
///
/// Clones are the same context. [`MemoryStorage::open_context`] opens another
/// context ("tab") on the same area.
#[derive(Clone)]
pub struct MemoryStorage {
    area: Rc<StorageArea>,
    context: ContextId,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            area: Rc::new(StorageArea {
                items: RefCell::new(BTreeMap::new()),
                listeners: RefCell::new(Listeners::default()),
                next_context: Cell::new(1),
                available: Cell::new(true),
            }),
            context: 0,
        }
    }

    pub fn open_context(&self) -> Self {
        let context = self.area.next_context.get();
        self.area.next_context.set(context + 1);
        Self {
            area: self.area.clone(),
            context,
        }
    }

    /// Simulate storage being disabled or over quota for every context.
    pub fn set_available(&self, available: bool) {
        self.area.available.set(available);
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.area.check_available()?;
        let old_value = self.area.items.borrow_mut().remove(key);
        if old_value.is_some() {
            self.area.broadcast(
                self.context,
                StorageChange {
                    key: Some(key.to_string()),
                    old_value,
                    new_value: None,
                },
            );
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.area.check_available()?;
        let had_items = {
            let mut items = self.area.items.borrow_mut();
            let had_items = !items.is_empty();
            items.clear();
            had_items
        };
        if had_items {
            self.area.broadcast(self.context, StorageChange::cleared());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.area.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("context", &self.context)
            .field("items", &self.area.items.borrow())
            .finish()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.area.check_available()?;
        Ok(self.area.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.area.check_available()?;
        let old_value = self
            .area
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());

        // Browsers only announce writes that change the stored value.
        if old_value.as_deref() == Some(value) {
            return Ok(());
        }
        debug!("Storage context {} wrote {} = {}", self.context, key, value);
        self.area.broadcast(
            self.context,
            StorageChange {
                key: Some(key.to_string()),
                old_value,
                new_value: Some(value.to_string()),
            },
        );
        Ok(())
    }
}

impl StorageEvents for MemoryStorage {
    fn subscribe_storage(&self, listener: Rc<dyn Fn(&StorageChange)>) -> Subscription {
        let id = self.area.listeners.borrow_mut().add(Rc::new(ContextListener {
            context: self.context,
            callback: listener,
        }));
        let area: Weak<StorageArea> = Rc::downgrade(&self.area);
        Subscription::new(Some(id), move || {
            if let Some(area) = area.upgrade() {
                area.listeners.borrow_mut().remove(id);
            }
        })
    }
}

/// An ordered set of class names standing in for `Element.classList`.
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct ClassList {
    classes: Rc<RefCell<Vec<String>>>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }
}

impl ClassTarget for ClassList {
    fn add_class(&self, class: &str) {
        if !self.contains(class) {
            self.classes.borrow_mut().push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }
}

/// Queues deferred tasks until [`ManualScheduler::run_pending`] is called,
/// standing in for "the next turn of the event loop".
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<VecDeque<Box<dyn FnOnce()>>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run the tasks queued so far. Tasks they schedule wait for the next call.
    pub fn run_pending(&self) -> usize {
        let tasks: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, task: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(task);
    }
}
