//! Keeps one browsing context's applied theme in step with other contexts
//! and with the OS preference.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::applier::ThemeApplier;
use crate::error::ThemeError;
use crate::listeners::Listeners;
use crate::manager::ThemeManager;
use crate::subscription::Subscription;
use crate::theme::ThemeName;

/// A write to shared storage made by another browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// `None` when the whole storage area was cleared.
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl StorageChange {
    pub fn cleared() -> Self {
        Self {
            key: None,
            old_value: None,
            new_value: None,
        }
    }

    /// Whether this change can affect the value stored under `key`.
    pub fn touches(&self, key: &str) -> bool {
        self.key.as_deref().map_or(true, |changed| changed == key)
    }
}

/// Source of storage-change notifications.
///
/// Implementations must not notify the context that made the write; the
/// browser's `storage` event already behaves this way.
pub trait StorageEvents {
    fn subscribe_storage(&self, listener: Rc<dyn Fn(&StorageChange)>) -> Subscription;
}

struct SyncState {
    manager: ThemeManager,
    applier: ThemeApplier,
    observers: RefCell<Listeners<dyn Fn(ThemeName)>>,
    system_watch: RefCell<Option<Subscription>>,
}

impl SyncState {
    fn resync(self: &Rc<Self>) -> ThemeName {
        let theme = self.manager.get_current_theme();
        self.applier.apply(&self.manager, Some(theme));
        self.watch_system_preference(theme);

        let observers = self.observers.borrow().snapshot();
        for (_, observer) in observers {
            observer(theme);
        }
        theme
    }

    /// Subscribe to OS preference changes only while `theme` is `system`.
    fn watch_system_preference(self: &Rc<Self>, theme: ThemeName) {
        let watching = self.system_watch.borrow().is_some();
        if theme.is_system() == watching {
            return;
        }

        if theme.is_system() {
            debug!("Watching system dark preference");
            let state = Rc::downgrade(self);
            let subscription = self
                .applier
                .preference()
                .add_change_listener(Rc::new(move |dark| {
                    if let Some(state) = state.upgrade() {
                        debug!("System dark preference is now {}", dark);
                        state.resync();
                    }
                }));
            *self.system_watch.borrow_mut() = Some(subscription);
        } else {
            debug!("No longer watching system dark preference");
            let subscription = self.system_watch.borrow_mut().take();
            drop(subscription);
        }
    }
}

/// The subscriptions one UI context needs to stay consistent.
///
/// Another context's write to the theme key, or an OS preference flip while
/// the theme is `system`, re-reads the manager, re-applies the appearance
/// and notifies [`on_resync`](Self::on_resync) observers. Dropping the value
/// releases every subscription it installed.
pub struct ThemeSync {
    state: Rc<SyncState>,
    _storage_watch: Subscription,
    _change_watch: Subscription,
}

impl ThemeSync {
    pub fn new(manager: ThemeManager, applier: ThemeApplier, events: &dyn StorageEvents) -> Self {
        let state = Rc::new(SyncState {
            manager,
            applier,
            observers: RefCell::new(Listeners::default()),
            system_watch: RefCell::new(None),
        });

        let key = state.manager.storage().key().to_string();
        let weak: Weak<SyncState> = Rc::downgrade(&state);
        let storage_watch = events.subscribe_storage(Rc::new(move |change: &StorageChange| {
            if !change.touches(&key) {
                return;
            }
            if let Some(state) = weak.upgrade() {
                info!("Theme changed in another context, resyncing");
                state.resync();
            }
        }));

        let weak: Weak<SyncState> = Rc::downgrade(&state);
        let change_watch = state.manager.subscribe(move |theme| {
            if let Some(state) = weak.upgrade() {
                state.watch_system_preference(theme);
            }
            Ok(())
        });

        state.watch_system_preference(state.manager.get_current_theme());

        Self {
            state,
            _storage_watch: storage_watch,
            _change_watch: change_watch,
        }
    }

    pub fn manager(&self) -> &ThemeManager {
        &self.state.manager
    }

    pub fn applier(&self) -> &ThemeApplier {
        &self.state.applier
    }

    pub fn theme(&self) -> ThemeName {
        self.state.manager.get_current_theme()
    }

    /// Bring the target in line with storage, e.g. on first render.
    pub fn sync_on_mount(&self) -> ThemeName {
        let theme = self.theme();
        self.state.applier.apply(&self.state.manager, Some(theme));
        theme
    }

    /// Re-read the stored theme, re-apply it and notify observers.
    pub fn resync(&self) -> ThemeName {
        self.state.resync()
    }

    /// Persist `theme_name` (normalized by the manager) and apply it.
    pub fn set_theme(&self, theme_name: &str) -> Result<ThemeName, ThemeError> {
        let theme = self.state.manager.set_current_theme(theme_name)?;
        self.state.applier.apply(&self.state.manager, Some(theme));
        Ok(theme)
    }

    /// Set the theme computed from the current one.
    pub fn update_theme(
        &self,
        next: impl FnOnce(ThemeName) -> ThemeName,
    ) -> Result<ThemeName, ThemeError> {
        let next = next(self.theme());
        self.set_theme(next.as_str())
    }

    /// Called with the theme after every resync triggered from outside this
    /// context.
    pub fn on_resync(&self, observer: impl Fn(ThemeName) + 'static) -> Subscription {
        let id = self.state.observers.borrow_mut().add(Rc::new(observer));
        let state: Weak<SyncState> = Rc::downgrade(&self.state);
        Subscription::new(Some(id), move || {
            if let Some(state) = state.upgrade() {
                state.observers.borrow_mut().remove(id);
            }
        })
    }

    pub fn is_watching_system_preference(&self) -> bool {
        self.state.system_watch.borrow().is_some()
    }
}

impl fmt::Debug for ThemeSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeSync")
            .field("manager", &self.state.manager)
            .field("watching_system", &self.is_watching_system_preference())
            .finish()
    }
}
