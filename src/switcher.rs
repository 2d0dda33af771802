//! Leptos bindings for the theme engine.

use leptos::prelude::*;
use tracing::warn;

use crate::config::ThemeConfig;
use crate::error::ThemeError;
use crate::manager::ThemeManager;
use crate::sync::ThemeSync;
use crate::theme::ThemeName;
use crate::web;

/// A signal that tracks `manager`'s current theme.
///
/// The manager subscription lives as long as the current reactive owner.
pub fn use_current_theme(manager: &ThemeManager) -> ReadSignal<ThemeName> {
    current_theme_signal(manager).0
}

fn current_theme_signal(manager: &ThemeManager) -> (ReadSignal<ThemeName>, WriteSignal<ThemeName>) {
    let (theme, set_theme) = signal(manager.get_current_theme());
    let subscription = manager.subscribe(move |next| {
        set_theme.try_set(next);
        Ok(())
    });
    StoredValue::new_local(subscription);
    (theme, set_theme)
}

pub struct UseThemeSwitcherOptions {
    pub manager: ThemeManager,
    pub sync_on_mount: bool,
    pub config: ThemeConfig,
}

impl UseThemeSwitcherOptions {
    pub fn new(manager: ThemeManager) -> Self {
        Self {
            manager,
            sync_on_mount: true,
            config: ThemeConfig::default(),
        }
    }

    pub fn from_config(manager: ThemeManager, config: ThemeConfig) -> Self {
        Self {
            manager,
            sync_on_mount: config.sync_on_mount,
            config,
        }
    }
}

/// Handle returned by [`use_theme_switcher`]. `Copy`, so it can go straight
/// into `provide_context`.
#[derive(Clone, Copy)]
pub struct ThemeSwitcher {
    pub theme: ReadSignal<ThemeName>,
    sync: StoredValue<ThemeSync, LocalStorage>,
}

impl ThemeSwitcher {
    /// Persist and apply `theme_name`. Unknown names become the default theme.
    pub fn set(&self, theme_name: &str) -> Result<ThemeName, ThemeError> {
        self.sync
            .try_with_value(|sync| sync.set_theme(theme_name))
            .unwrap_or(Err(ThemeError::Disposed))
    }

    pub fn update(&self, next: impl FnOnce(ThemeName) -> ThemeName) -> Result<ThemeName, ThemeError> {
        self.sync
            .try_with_value(|sync| sync.update_theme(next))
            .unwrap_or(Err(ThemeError::Disposed))
    }
}

/// Bind the document to `options.manager`: apply the stored theme on mount,
/// follow other tabs and the OS preference, and expose the theme as a
/// signal. All subscriptions are released with the reactive owner.
pub fn use_theme_switcher(options: UseThemeSwitcherOptions) -> Result<ThemeSwitcher, ThemeError> {
    let UseThemeSwitcherOptions {
        manager,
        sync_on_mount,
        config,
    } = options;

    let applier = web::document_applier()?.with_config(&config);
    let events = web::WindowStorageEvents::new()?;
    let sync = ThemeSync::new(manager.clone(), applier, &events);
    if sync_on_mount {
        sync.sync_on_mount();
    }

    // Another tab's write never reaches the manager's listeners, so resyncs
    // feed the signal too.
    let (theme, set_theme) = current_theme_signal(&manager);
    let resync_watch = sync.on_resync(move |next| {
        if set_theme.try_set(next).is_some() {
            warn!("Theme resync after the switcher was disposed");
        }
    });
    StoredValue::new_local(resync_watch);

    Ok(ThemeSwitcher {
        theme,
        sync: StoredValue::new_local(sync),
    })
}
