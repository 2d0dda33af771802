//! The OS-level "prefers dark" signal.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::listeners::Listeners;
use crate::subscription::Subscription;

pub const DARK_SCHEME_MEDIA_QUERY: &str = "(prefers-color-scheme: dark)";

/// A live, subscribable answer to "does the OS prefer dark?".
pub trait DarkPreferenceQuery {
    fn matches(&self) -> bool;

    /// Called with the new answer whenever it flips.
    fn add_change_listener(&self, listener: Rc<dyn Fn(bool)>) -> Subscription;
}

/// The platform's preference query.
///
/// In the browser this is `matchMedia("(prefers-color-scheme: dark)")`, or a
/// fixed light answer where matchMedia is missing. Elsewhere the OS setting
/// is probed with `dark-light`, without change events.
#[cfg(target_arch = "wasm32")]
pub fn system_dark_preference_query() -> Rc<dyn DarkPreferenceQuery> {
    match crate::web::MediaQueryPreference::system() {
        Some(query) => Rc::new(query),
        None => {
            debug!("matchMedia unavailable, assuming light preference");
            Rc::new(StaticPreference::light())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn system_dark_preference_query() -> Rc<dyn DarkPreferenceQuery> {
    Rc::new(OsPreference)
}

/// Read the preference from `query`, or from a fresh system query.
pub fn is_system_dark_preferred(query: Option<&dyn DarkPreferenceQuery>) -> bool {
    match query {
        Some(query) => query.matches(),
        None => system_dark_preference_query().matches(),
    }
}

/// A preference that never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPreference {
    dark: bool,
}

impl StaticPreference {
    pub fn dark() -> Self {
        Self { dark: true }
    }

    pub fn light() -> Self {
        Self { dark: false }
    }
}

impl DarkPreferenceQuery for StaticPreference {
    fn matches(&self) -> bool {
        self.dark
    }

    fn add_change_listener(&self, _listener: Rc<dyn Fn(bool)>) -> Subscription {
        Subscription::noop()
    }
}

struct ManualState {
    dark: Cell<bool>,
    listeners: RefCell<Listeners<dyn Fn(bool)>>,
}

/// A preference pushed in by the host, e.g. from a native OS notification.
/// Clones share state.
#[derive(Clone)]
pub struct ManualPreference {
    state: Rc<ManualState>,
}

impl ManualPreference {
    pub fn new(dark: bool) -> Self {
        Self {
            state: Rc::new(ManualState {
                dark: Cell::new(dark),
                listeners: RefCell::new(Listeners::default()),
            }),
        }
    }

    /// Update the preference, notifying listeners if it changed.
    pub fn set_dark(&self, dark: bool) {
        if self.state.dark.replace(dark) == dark {
            return;
        }
        debug!("System dark preference changed to {}", dark);
        let listeners = self.state.listeners.borrow().snapshot();
        for (_, listener) in listeners {
            listener(dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }
}

impl fmt::Debug for ManualPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualPreference")
            .field("dark", &self.state.dark.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl DarkPreferenceQuery for ManualPreference {
    fn matches(&self) -> bool {
        self.state.dark.get()
    }

    fn add_change_listener(&self, listener: Rc<dyn Fn(bool)>) -> Subscription {
        let id = self.state.listeners.borrow_mut().add(listener);
        let state: Weak<ManualState> = Rc::downgrade(&self.state);
        Subscription::new(Some(id), move || {
            if let Some(state) = state.upgrade() {
                state.listeners.borrow_mut().remove(id);
            }
        })
    }
}

/// The desktop OS setting, probed on every read.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct OsPreference;

#[cfg(not(target_arch = "wasm32"))]
impl DarkPreferenceQuery for OsPreference {
    fn matches(&self) -> bool {
        matches!(dark_light::detect(), dark_light::Mode::Dark)
    }

    fn add_change_listener(&self, _listener: Rc<dyn Fn(bool)>) -> Subscription {
        Subscription::noop()
    }
}
