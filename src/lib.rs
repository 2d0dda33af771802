//! Theme coordination for Leptos/WebAssembly front ends.
//!
//! A [`ThemeManager`] owns the user's choice (`system`, `dark` or `light`)
//! and persists it through a [`ThemeStorage`]. A [`ThemeApplier`] turns the
//! choice into classes on the document root, and [`ThemeSync`] keeps that in
//! step with other tabs and with the OS color scheme. Browser backends live
//! in [`web`]; [`memory`] provides in-memory ones for tests and other hosts.
//!
//! ```
//! use themesync::memory::{ClassList, ManualScheduler, MemoryStorage};
//! use themesync::preference::StaticPreference;
//! use themesync::{ThemeApplier, ThemeManager, ThemeName, ThemeStorage};
//!
//! let manager = ThemeManager::new(ThemeStorage::new(MemoryStorage::new()));
//! let root = ClassList::new();
//! let applier = ThemeApplier::new(root.clone(), StaticPreference::dark(), ManualScheduler::new());
//!
//! manager.set_current_theme("system").unwrap();
//! applier.apply(&manager, None);
//! assert!(root.contains("dark"));
//! assert_eq!(manager.get_current_theme(), ThemeName::System);
//! ```

pub mod applier;
pub mod config;
pub mod error;
mod listeners;
pub mod logging;
pub mod manager;
pub mod memory;
pub mod preference;
pub mod storage;
pub mod subscription;
pub mod switcher;
pub mod sync;
pub mod theme;
pub mod web;

pub use applier::{ClassTarget, Scheduler, ThemeApplier};
pub use config::ThemeConfig;
pub use error::{InvalidThemeName, StorageError, ThemeError};
pub use listeners::ListenerId;
pub use manager::{ThemeEvent, ThemeManager};
pub use preference::{is_system_dark_preferred, system_dark_preference_query, DarkPreferenceQuery};
pub use storage::{StorageBackend, ThemeStorage};
pub use subscription::Subscription;
pub use switcher::{use_current_theme, use_theme_switcher, ThemeSwitcher, UseThemeSwitcherOptions};
pub use sync::{StorageChange, StorageEvents, ThemeSync};
pub use theme::{
    is_dark_theme, is_system_theme, is_valid_theme_name, resolve_appearance, Appearance,
    ThemeClasses, ThemeName, THEME_NAMES,
};
