use std::fmt;

use crate::listeners::ListenerId;

/// Keeps a listener registered until it is unsubscribed or dropped.
///
/// Every registration in this crate (manager listeners, storage events,
/// preference changes) hands one of these back, so releasing a UI scope
/// releases its listeners with it.
#[must_use = "dropping a Subscription removes its listener"]
pub struct Subscription {
    id: Option<ListenerId>,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancellation callback. Platform adapters outside this crate
    /// use this to implement the event-source traits.
    pub fn new(id: Option<ListenerId>, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription to a source that never fires.
    pub fn noop() -> Self {
        Self { id: None, cancel: None }
    }

    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// Keep the listener registered for as long as its source lives.
    ///
    /// The cancel callback is leaked, not dropped: browser adapters keep the
    /// JS closure alive through it.
    pub fn forget(mut self) {
        if let Some(cancel) = self.cancel.take() {
            std::mem::forget(cancel);
        }
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
