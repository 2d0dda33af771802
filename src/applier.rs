use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::config::ThemeConfig;
use crate::manager::ThemeManager;
use crate::preference::DarkPreferenceQuery;
use crate::theme::{resolve_appearance, Appearance, ThemeClasses, ThemeName};

/// Class added while the appearance swaps so CSS can animate it.
pub const DEFAULT_TRANSITION_CLASS: &str = "transition-colors";

/// Anything with a class list, normally the document's root element.
pub trait ClassTarget {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
}

/// Runs a task after the current turn of the event loop.
pub trait Scheduler {
    fn schedule(&self, task: Box<dyn FnOnce()>);
}

/// Writes the resolved appearance onto a [`ClassTarget`].
#[derive(Clone)]
pub struct ThemeApplier {
    target: Rc<dyn ClassTarget>,
    preference: Rc<dyn DarkPreferenceQuery>,
    scheduler: Rc<dyn Scheduler>,
    transition_classes: Vec<String>,
    theme_classes: ThemeClasses,
}

impl ThemeApplier {
    pub fn new(
        target: impl ClassTarget + 'static,
        preference: impl DarkPreferenceQuery + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> Self {
        Self::from_shared(Rc::new(target), Rc::new(preference), Rc::new(scheduler))
    }

    pub fn from_shared(
        target: Rc<dyn ClassTarget>,
        preference: Rc<dyn DarkPreferenceQuery>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            target,
            preference,
            scheduler,
            transition_classes: vec![DEFAULT_TRANSITION_CLASS.to_string()],
            theme_classes: ThemeClasses::default(),
        }
    }

    pub fn with_transition_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transition_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_theme_classes(mut self, classes: ThemeClasses) -> Self {
        self.theme_classes = classes;
        self
    }

    /// Take class names from `config`.
    pub fn with_config(self, config: &ThemeConfig) -> Self {
        self.with_transition_classes(config.transition_classes.iter().cloned())
            .with_theme_classes(config.theme_classes.clone())
    }

    pub fn preference(&self) -> &Rc<dyn DarkPreferenceQuery> {
        &self.preference
    }

    pub fn transition_classes(&self) -> &[String] {
        &self.transition_classes
    }

    pub fn theme_classes(&self) -> &ThemeClasses {
        &self.theme_classes
    }

    /// The appearance `theme` resolves to right now. The OS preference is
    /// only consulted for [`ThemeName::System`].
    pub fn resolve(&self, theme: ThemeName) -> Appearance {
        resolve_appearance(theme, theme.is_system() && self.preference.matches())
    }

    /// Apply `current_theme`, or the manager's current theme when `None`.
    pub fn apply(&self, manager: &ThemeManager, current_theme: Option<ThemeName>) -> Appearance {
        let theme = current_theme.unwrap_or_else(|| manager.get_current_theme());
        self.apply_theme(theme)
    }

    /// Swap the target's appearance classes to match `theme`.
    ///
    /// The transition classes go on first and come off on the next
    /// scheduler turn, so they are present for at least one paint.
    pub fn apply_theme(&self, theme: ThemeName) -> Appearance {
        for class in &self.transition_classes {
            self.target.add_class(class);
        }

        let appearance = self.resolve(theme);
        debug!("Applying theme {} as {}", theme, appearance);

        // Remove before adding so a class shared by both appearances stays on.
        for (entry, classes) in self.theme_classes.entries() {
            if entry != appearance {
                for class in classes {
                    self.target.remove_class(class);
                }
            }
        }
        for class in self.theme_classes.classes_for(appearance) {
            self.target.add_class(class);
        }

        let target = self.target.clone();
        let transition_classes = self.transition_classes.clone();
        self.scheduler.schedule(Box::new(move || {
            for class in &transition_classes {
                target.remove_class(class);
            }
        }));

        appearance
    }
}

impl fmt::Debug for ThemeApplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeApplier")
            .field("transition_classes", &self.transition_classes)
            .field("theme_classes", &self.theme_classes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ClassList, ManualScheduler, MemoryStorage};
    use crate::preference::{ManualPreference, StaticPreference};
    use crate::storage::ThemeStorage;

    fn applier(prefers_dark: bool) -> (ThemeApplier, ClassList, ManualScheduler) {
        let target = ClassList::new();
        let scheduler = ManualScheduler::new();
        let preference = if prefers_dark {
            StaticPreference::dark()
        } else {
            StaticPreference::light()
        };
        let applier = ThemeApplier::new(target.clone(), preference, scheduler.clone());
        (applier, target, scheduler)
    }

    #[test]
    fn test_system_theme_follows_preference() {
        let (dark_applier, dark_target, _) = applier(true);
        assert_eq!(dark_applier.apply_theme(ThemeName::System), Appearance::Dark);
        assert!(dark_target.contains("dark"));
        assert!(!dark_target.contains("system"));

        let (light_applier, light_target, _) = applier(false);
        assert_eq!(light_applier.apply_theme(ThemeName::System), Appearance::Light);
        assert!(light_target.contains("light"));
        assert!(!light_target.contains("dark"));
    }

    #[test]
    fn test_pinned_theme_ignores_preference() {
        let (applier, target, _) = applier(true);
        assert_eq!(applier.apply_theme(ThemeName::Light), Appearance::Light);
        assert!(target.contains("light"));
        assert!(!target.contains("dark"));
    }

    #[test]
    fn test_transition_class_is_removed_on_next_turn() {
        let (applier, target, scheduler) = applier(false);
        applier.apply_theme(ThemeName::Dark);

        assert!(target.contains(DEFAULT_TRANSITION_CLASS));
        assert_eq!(scheduler.run_pending(), 1);
        assert!(!target.contains(DEFAULT_TRANSITION_CLASS));
        assert_eq!(target.classes(), vec!["dark"]);
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let (applier, target, scheduler) = applier(true);
        applier.apply_theme(ThemeName::System);
        scheduler.run_pending();
        let once = target.classes();

        applier.apply_theme(ThemeName::System);
        scheduler.run_pending();
        assert_eq!(target.classes(), once);
    }

    #[test]
    fn test_switch_leaves_no_stale_classes() {
        let (applier, target, scheduler) = applier(false);
        target.add_class("light");
        target.add_class("dark");
        target.add_class("unrelated");

        applier.apply_theme(ThemeName::Dark);
        scheduler.run_pending();
        assert_eq!(target.classes(), vec!["dark", "unrelated"]);
    }

    #[test]
    fn test_custom_classes_and_shared_class() {
        let (applier, target, scheduler) = applier(false);
        let applier = applier
            .with_transition_classes(["changing-theme", "no-flash"])
            .with_theme_classes(ThemeClasses {
                dark: vec!["theme-dark".into(), "themed".into()],
                light: vec!["theme-light".into(), "themed".into()],
            });

        applier.apply_theme(ThemeName::Dark);
        assert!(target.contains("changing-theme"));
        assert!(target.contains("no-flash"));
        assert!(target.contains("theme-dark"));
        assert!(target.contains("themed"));

        applier.apply_theme(ThemeName::Light);
        scheduler.run_pending();
        assert_eq!(target.classes(), vec!["theme-light", "themed"]);
    }

    #[test]
    fn test_apply_reads_manager_when_no_theme_given() {
        let manager = crate::manager::ThemeManager::new(ThemeStorage::new(MemoryStorage::new()));
        manager.set_current_theme("light").unwrap();
        let (applier, target, _) = applier(true);

        assert_eq!(applier.apply(&manager, None), Appearance::Light);
        assert_eq!(applier.apply(&manager, Some(ThemeName::Dark)), Appearance::Dark);
        assert!(target.contains("dark"));
        assert!(!target.contains("light"));
    }

    #[test]
    fn test_preference_read_live_on_each_apply() {
        let target = ClassList::new();
        let preference = ManualPreference::new(false);
        let applier = ThemeApplier::new(target.clone(), preference.clone(), ManualScheduler::new());

        applier.apply_theme(ThemeName::System);
        assert!(target.contains("light"));

        preference.set_dark(true);
        applier.apply_theme(ThemeName::System);
        assert!(target.contains("dark"));
        assert!(!target.contains("light"));
    }
}
