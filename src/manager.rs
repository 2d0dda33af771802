use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, warn};

use crate::config::ThemeConfig;
use crate::error::ThemeError;
use crate::listeners::{ListenerId, Listeners};
use crate::storage::{StorageBackend, ThemeStorage};
use crate::subscription::Subscription;
use crate::theme::ThemeName;

/// Events a [`ThemeManager`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeEvent {
    /// A theme was written through [`ThemeManager::set_current_theme`].
    Change,
}

/// Receives the resolved theme after each successful set. An `Err` is
/// logged and does not affect other listeners.
pub type ThemeListener = dyn Fn(ThemeName) -> anyhow::Result<()>;

struct ManagerInner {
    storage: ThemeStorage,
    default_theme: ThemeName,
    change_listeners: RefCell<Listeners<ThemeListener>>,
}

/// Owner of the current theme for one theme scope.
///
/// The value lives in storage and is read on demand, so several managers on
/// the same key (or other tabs) never hold a stale copy. Cloning yields
/// another handle to the same scope.
#[derive(Clone)]
pub struct ThemeManager {
    inner: Rc<ManagerInner>,
}

impl ThemeManager {
    pub fn new(storage: ThemeStorage) -> Self {
        Self::with_default_theme(storage, ThemeName::default())
    }

    pub fn with_default_theme(storage: ThemeStorage, default_theme: ThemeName) -> Self {
        Self {
            inner: Rc::new(ManagerInner {
                storage,
                default_theme,
                change_listeners: RefCell::new(Listeners::default()),
            }),
        }
    }

    pub fn from_config(config: &ThemeConfig, backend: Rc<dyn StorageBackend>) -> Self {
        let storage = ThemeStorage::from_shared(backend, config.storage_key.clone());
        Self::with_default_theme(storage, config.default_theme)
    }

    pub fn storage(&self) -> &ThemeStorage {
        &self.inner.storage
    }

    pub fn default_theme(&self) -> ThemeName {
        self.inner.default_theme
    }

    /// Whether both handles refer to the same theme scope.
    pub fn ptr_eq(&self, other: &ThemeManager) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The stored theme, or the default when storage is empty, holds an
    /// unknown value, or cannot be read.
    pub fn get_current_theme(&self) -> ThemeName {
        self.try_get_current_theme().unwrap_or_else(|e| {
            warn!(
                "Falling back to default theme {}: {}",
                self.inner.default_theme, e
            );
            self.inner.default_theme
        })
    }

    /// Like [`get_current_theme`](Self::get_current_theme) but reports
    /// storage failures instead of falling back.
    pub fn try_get_current_theme(&self) -> Result<ThemeName, ThemeError> {
        let raw = self.inner.storage.get()?;
        Ok(raw
            .and_then(|value| value.parse().ok())
            .unwrap_or(self.inner.default_theme))
    }

    /// Alias of [`get_current_theme`](Self::get_current_theme) for
    /// external-store bindings.
    pub fn snapshot(&self) -> ThemeName {
        self.get_current_theme()
    }

    /// Persist `theme_name` and notify change listeners.
    ///
    /// Unknown names are replaced by the default theme instead of failing,
    /// so free-form input can never corrupt the stored value. Returns the
    /// theme that was actually stored. A storage failure is returned before
    /// any listener runs.
    pub fn set_current_theme(&self, theme_name: &str) -> Result<ThemeName, ThemeError> {
        let theme = theme_name.parse().unwrap_or_else(|_| {
            debug!(
                "Unknown theme {:?}, using default {}",
                theme_name, self.inner.default_theme
            );
            self.inner.default_theme
        });
        self.set_theme(theme)
    }

    pub fn set_theme(&self, theme: ThemeName) -> Result<ThemeName, ThemeError> {
        info!("Setting theme: {} = {}", self.inner.storage.key(), theme);
        self.inner.storage.set(theme.as_str())?;
        self.dispatch_change(theme);
        Ok(theme)
    }

    pub fn add_event_listener(
        &self,
        event: ThemeEvent,
        listener: impl Fn(ThemeName) -> anyhow::Result<()> + 'static,
    ) -> Subscription {
        let id = self.listeners(event).borrow_mut().add(Rc::new(listener));
        let inner: Weak<ManagerInner> = Rc::downgrade(&self.inner);
        Subscription::new(Some(id), move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners(event).borrow_mut().remove(id);
            }
        })
    }

    pub fn remove_event_listener(&self, event: ThemeEvent, id: ListenerId) -> bool {
        self.listeners(event).borrow_mut().remove(id)
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(ThemeName) -> anyhow::Result<()> + 'static,
    ) -> Subscription {
        self.add_event_listener(ThemeEvent::Change, listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.remove_event_listener(ThemeEvent::Change, id)
    }

    pub fn listener_count(&self, event: ThemeEvent) -> usize {
        self.listeners(event).borrow().len()
    }

    fn listeners(&self, event: ThemeEvent) -> &RefCell<Listeners<ThemeListener>> {
        self.inner.listeners(event)
    }

    fn dispatch_change(&self, theme: ThemeName) {
        let listeners = self.listeners(ThemeEvent::Change).borrow().snapshot();
        for (id, listener) in listeners {
            match catch_listener_panic(|| listener(theme)) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Theme change listener {} failed: {:#}", id, e);
                }
                Err(message) => {
                    error!("Theme change listener {} panicked: {}", id, message);
                }
            }
        }
    }
}

impl ManagerInner {
    fn listeners(&self, event: ThemeEvent) -> &RefCell<Listeners<ThemeListener>> {
        match event {
            ThemeEvent::Change => &self.change_listeners,
        }
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("storage", &self.inner.storage)
            .field("default_theme", &self.inner.default_theme)
            .field("listeners", &self.listener_count(ThemeEvent::Change))
            .finish()
    }
}

/// Run a listener, turning a panic into its message. Only effective where
/// the target unwinds; with `panic = "abort"` a panic still ends the program.
fn catch_listener_panic<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string())
    })
}
