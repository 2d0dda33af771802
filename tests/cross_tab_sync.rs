use std::cell::RefCell;
use std::rc::Rc;

use anyhow::bail;
use themesync::memory::{ClassList, ManualScheduler, MemoryStorage};
use themesync::preference::ManualPreference;
use themesync::{ThemeApplier, ThemeConfig, ThemeManager, ThemeName, ThemeStorage, ThemeSync};

struct Tab {
    manager: ThemeManager,
    root: ClassList,
    scheduler: ManualScheduler,
    sync: ThemeSync,
}

fn open_tab(storage: MemoryStorage, preference: &ManualPreference) -> Tab {
    let manager = ThemeManager::new(ThemeStorage::new(storage.clone()));
    let root = ClassList::new();
    let scheduler = ManualScheduler::new();
    let applier = ThemeApplier::new(root.clone(), preference.clone(), scheduler.clone());
    let sync = ThemeSync::new(manager.clone(), applier, &storage);
    sync.sync_on_mount();
    scheduler.run_pending();
    Tab {
        manager,
        root,
        scheduler,
        sync,
    }
}

#[test]
fn test_second_tab_converges_without_setting_theme() {
    let preference = ManualPreference::new(true);
    let area = MemoryStorage::new();
    let tab1 = open_tab(area.clone(), &preference);
    let tab2 = open_tab(area.open_context(), &preference);
    assert!(tab2.root.contains("dark"));

    let tab2_sets = Rc::new(RefCell::new(0));
    let counter = tab2_sets.clone();
    let _watch = tab2.manager.subscribe(move |_| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    tab1.manager.set_current_theme("light").unwrap();

    assert!(tab2.root.contains("light"));
    assert!(!tab2.root.contains("dark"));
    assert_eq!(*tab2_sets.borrow(), 0);

    tab2.scheduler.run_pending();
    assert_eq!(tab2.root.classes(), vec!["light"]);
}

#[test]
fn test_resync_observers_see_remote_theme() {
    let preference = ManualPreference::new(false);
    let area = MemoryStorage::new();
    let tab1 = open_tab(area.clone(), &preference);
    let tab2 = open_tab(area.open_context(), &preference);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _obs = tab2.sync.on_resync(move |theme| sink.borrow_mut().push(theme));

    tab1.sync.set_theme("dark").unwrap();
    tab1.sync.set_theme("system").unwrap();

    assert_eq!(*seen.borrow(), vec![ThemeName::Dark, ThemeName::System]);
}

#[test]
fn test_all_tabs_follow_os_flip_while_on_system() {
    let preference = ManualPreference::new(false);
    let area = MemoryStorage::new();
    let tabs: Vec<Tab> = (0..3)
        .map(|_| open_tab(area.open_context(), &preference))
        .collect();

    preference.set_dark(true);
    for tab in &tabs {
        tab.scheduler.run_pending();
        assert_eq!(tab.root.classes(), vec!["dark"]);
    }

    tabs[0].sync.set_theme("light").unwrap();
    preference.set_dark(false);
    preference.set_dark(true);
    for tab in &tabs {
        tab.scheduler.run_pending();
        assert_eq!(tab.root.classes(), vec!["light"]);
        assert!(!tab.sync.is_watching_system_preference());
    }
}

#[test]
fn test_failing_listener_does_not_break_sync() {
    let preference = ManualPreference::new(false);
    let area = MemoryStorage::new();
    let tab1 = open_tab(area.clone(), &preference);
    let tab2 = open_tab(area.open_context(), &preference);
    let _bad = tab1.manager.subscribe(|_| bail!("renderer gone"));

    let stored = tab1.sync.set_theme("dark").unwrap();

    assert_eq!(stored, ThemeName::Dark);
    assert!(tab1.root.contains("dark"));
    assert!(tab2.root.contains("dark"));
}

#[test]
fn test_independent_scopes_on_one_page() {
    let preference = ManualPreference::new(false);
    let area = MemoryStorage::new();
    let other_tab = area.open_context();

    let config = ThemeConfig::from_json(r#"{"storage_key": "docs-theme", "default_theme": "light"}"#).unwrap();
    let docs = ThemeManager::from_config(&config, Rc::new(area.clone()));
    let docs_root = ClassList::new();
    let docs_sync = ThemeSync::new(
        docs.clone(),
        ThemeApplier::new(docs_root.clone(), preference.clone(), ManualScheduler::new()).with_config(&config),
        &area,
    );
    let main = open_tab(area.clone(), &preference);
    docs_sync.sync_on_mount();
    assert!(docs_root.contains("light"));

    ThemeManager::new(ThemeStorage::new(other_tab.clone()))
        .set_current_theme("dark")
        .unwrap();
    assert!(main.root.contains("dark"));
    assert!(docs_root.contains("light"));
    assert!(!docs_root.contains("dark"));

    ThemeManager::from_config(&config, Rc::new(other_tab))
        .set_current_theme("dark")
        .unwrap();
    assert!(docs_root.contains("dark"));
}

#[test]
fn test_storage_failure_is_reported_to_caller() {
    let preference = ManualPreference::new(false);
    let area = MemoryStorage::new();
    let tab = open_tab(area.clone(), &preference);
    area.set_available(false);

    assert!(tab.sync.set_theme("dark").is_err());
    assert!(!tab.root.contains("dark"));
}

#[test]
fn test_removed_key_falls_back_to_default_in_other_tabs() {
    let preference = ManualPreference::new(false);
    let area = MemoryStorage::new();
    let tab1 = open_tab(area.clone(), &preference);
    let tab2 = open_tab(area.open_context(), &preference);
    tab1.sync.set_theme("dark").unwrap();
    tab2.scheduler.run_pending();
    assert_eq!(tab2.root.classes(), vec!["dark"]);

    area.remove_item("theme").unwrap();

    assert_eq!(tab2.manager.get_current_theme(), ThemeName::System);
    assert!(tab2.sync.is_watching_system_preference());
    tab2.scheduler.run_pending();
    assert_eq!(tab2.root.classes(), vec!["light"]);
}
