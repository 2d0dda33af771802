use std::fmt;
use std::rc::Rc;

use crate::error::StorageError;

pub const DEFAULT_STORAGE_KEY: &str = "theme";

/// A string key/value medium such as `localStorage`.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Durable slot for the chosen theme, scoped to one storage key.
///
/// Values are stored raw; validation happens in the manager.
#[derive(Clone)]
pub struct ThemeStorage {
    key: String,
    backend: Rc<dyn StorageBackend>,
}

impl ThemeStorage {
    /// Store under the default `"theme"` key.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: impl StorageBackend + 'static, key: impl Into<String>) -> Self {
        Self::from_shared(Rc::new(backend), key)
    }

    pub fn from_shared(backend: Rc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            backend,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> Result<Option<String>, StorageError> {
        self.backend.get_item(&self.key)
    }

    pub fn set(&self, value: &str) -> Result<(), StorageError> {
        self.backend.set_item(&self.key, value)
    }
}

impl fmt::Debug for ThemeStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStorage").field("key", &self.key).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;

    #[test]
    fn test_absent_key_reads_none() {
        let storage = ThemeStorage::new(MemoryStorage::new());
        assert_eq!(storage.key(), "theme");
        assert_eq!(storage.get().unwrap(), None);
    }

    #[test]
    fn test_set_overwrites_without_validation() {
        let storage = ThemeStorage::new(MemoryStorage::new());
        storage.set("dark").unwrap();
        storage.set("not-a-theme").unwrap();
        assert_eq!(storage.get().unwrap().as_deref(), Some("not-a-theme"));
    }

    #[test]
    fn test_same_key_shares_value() {
        let area = MemoryStorage::new();
        let first = ThemeStorage::new(area.clone());
        let second = ThemeStorage::new(area);

        first.set("light").unwrap();
        assert_eq!(second.get().unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_different_keys_are_independent() {
        let area = MemoryStorage::new();
        let main = ThemeStorage::new(area.clone());
        let sidebar = ThemeStorage::with_key(area, "sidebar-theme");

        main.set("dark").unwrap();
        sidebar.set("light").unwrap();
        assert_eq!(main.get().unwrap().as_deref(), Some("dark"));
        assert_eq!(sidebar.get().unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_unavailable_medium_surfaces_errors() {
        let area = MemoryStorage::new();
        let storage = ThemeStorage::new(area.clone());
        area.set_available(false);

        assert!(matches!(storage.set("dark"), Err(StorageError::Unavailable(_))));
        assert!(matches!(storage.get(), Err(StorageError::Unavailable(_))));
    }
}
