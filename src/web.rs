//! Browser implementations of the platform traits, on `web-sys`.

use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, MediaQueryList, MediaQueryListEvent, Storage, StorageEvent, Window};

use crate::applier::{ClassTarget, Scheduler, ThemeApplier};
use crate::config::ThemeConfig;
use crate::error::{StorageError, ThemeError};
use crate::manager::ThemeManager;
use crate::preference::{system_dark_preference_query, DarkPreferenceQuery, DARK_SCHEME_MEDIA_QUERY};
use crate::storage::StorageBackend;
use crate::subscription::Subscription;
use crate::sync::{StorageChange, StorageEvents};

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn window() -> Result<Window, ThemeError> {
    web_sys::window().ok_or_else(|| ThemeError::Platform("no global window".to_string()))
}

/// `document.documentElement`, the default target for theme classes.
pub fn document_root() -> Result<Element, ThemeError> {
    window()?
        .document()
        .and_then(|doc| doc.document_element())
        .ok_or_else(|| ThemeError::Platform("no document element".to_string()))
}

/// `window.localStorage`.
#[derive(Debug, Clone)]
pub struct BrowserStorage {
    storage: Storage,
}

impl BrowserStorage {
    pub fn local() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no global window".to_string()))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Unavailable("localStorage is missing".to_string())),
            Err(e) => Err(StorageError::Unavailable(js_error(&e))),
        }
    }
}

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_string(),
            reason: js_error(&e),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: js_error(&e),
        })
    }
}

/// The window's `storage` event, fired for writes made by other tabs.
#[derive(Debug, Clone)]
pub struct WindowStorageEvents {
    window: Window,
}

impl WindowStorageEvents {
    pub fn new() -> Result<Self, ThemeError> {
        Ok(Self { window: window()? })
    }
}

impl StorageEvents for WindowStorageEvents {
    fn subscribe_storage(&self, listener: Rc<dyn Fn(&StorageChange)>) -> Subscription {
        let closure = Closure::<dyn FnMut(StorageEvent)>::new(move |event: StorageEvent| {
            listener(&StorageChange {
                key: event.key(),
                old_value: event.old_value(),
                new_value: event.new_value(),
            });
        });

        if let Err(e) = self
            .window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
        {
            warn!("Failed to listen for storage events: {}", js_error(&e));
            return Subscription::noop();
        }

        let window = self.window.clone();
        Subscription::new(None, move || {
            let _ = window.remove_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
        })
    }
}

/// `matchMedia("(prefers-color-scheme: dark)")`.
#[derive(Debug, Clone)]
pub struct MediaQueryPreference {
    list: MediaQueryList,
}

impl MediaQueryPreference {
    /// `None` where matchMedia is unsupported.
    pub fn system() -> Option<Self> {
        let list = web_sys::window()?
            .match_media(DARK_SCHEME_MEDIA_QUERY)
            .ok()
            .flatten()?;
        Some(Self { list })
    }
}

impl DarkPreferenceQuery for MediaQueryPreference {
    fn matches(&self) -> bool {
        self.list.matches()
    }

    fn add_change_listener(&self, listener: Rc<dyn Fn(bool)>) -> Subscription {
        let closure = Closure::<dyn FnMut(MediaQueryListEvent)>::new(move |event: MediaQueryListEvent| {
            listener(event.matches());
        });

        if let Err(e) = self
            .list
            .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        {
            warn!("Failed to listen for color scheme changes: {}", js_error(&e));
            return Subscription::noop();
        }

        let list = self.list.clone();
        Subscription::new(None, move || {
            let _ = list.remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        })
    }
}

impl ClassTarget for Element {
    fn add_class(&self, class: &str) {
        if let Err(e) = self.class_list().add_1(class) {
            warn!("Failed to add class {:?}: {}", class, js_error(&e));
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(e) = self.class_list().remove_1(class) {
            warn!("Failed to remove class {:?}: {}", class, js_error(&e));
        }
    }
}

/// Defers tasks with `setTimeout(task, 0)`.
#[derive(Debug, Clone)]
pub struct TimeoutScheduler {
    window: Window,
}

impl TimeoutScheduler {
    pub fn new() -> Result<Self, ThemeError> {
        Ok(Self { window: window()? })
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        if let Err(e) = self
            .window
            .set_timeout_with_callback(callback.unchecked_ref())
        {
            warn!("Failed to schedule deferred task: {}", js_error(&e));
        }
    }
}

/// An applier for `document.documentElement` using the live color-scheme
/// query and `setTimeout`.
pub fn document_applier() -> Result<ThemeApplier, ThemeError> {
    let root = document_root()?;
    let scheduler = TimeoutScheduler::new()?;
    Ok(ThemeApplier::from_shared(
        Rc::new(root),
        system_dark_preference_query(),
        Rc::new(scheduler),
    ))
}

/// A manager over `localStorage` with the default key and default theme.
pub fn default_theme_manager() -> Result<ThemeManager, ThemeError> {
    theme_manager_from_config(&ThemeConfig::default())
}

pub fn theme_manager_from_config(config: &ThemeConfig) -> Result<ThemeManager, ThemeError> {
    let storage = BrowserStorage::local()?;
    debug!("Using localStorage key {:?}", config.storage_key);
    Ok(ThemeManager::from_config(config, Rc::new(storage)))
}
