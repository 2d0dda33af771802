use std::fmt;
use std::rc::Rc;

/// Identifies one registered listener within its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Insertion-ordered listener registry.
///
/// Dispatch goes through [`Listeners::snapshot`] so callbacks never run
/// while the owning `RefCell` is borrowed.
pub(crate) struct Listeners<F: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<F>)>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) fn add(&mut self, listener: Rc<F>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<(ListenerId, Rc<F>)> {
        self.entries.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
