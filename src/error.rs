use thiserror::Error;

/// Failure of the key/value medium behind a [`ThemeStorage`](crate::storage::ThemeStorage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write '{key}': {reason}")]
    Write { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Theme switcher used after its owner was disposed")]
    Disposed,
}

/// Returned when parsing a string that is not one of the known theme names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid theme name: {0:?}")]
pub struct InvalidThemeName(pub String);

impl From<ThemeError> for String {
    fn from(err: ThemeError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_converts_into_theme_error() {
        let err: ThemeError = StorageError::Write {
            key: "theme".to_string(),
            reason: "QuotaExceededError".to_string(),
        }
        .into();
        assert!(matches!(err, ThemeError::Storage(StorageError::Write { .. })));
        assert_eq!(
            String::from(err),
            "Storage error: Failed to write 'theme': QuotaExceededError"
        );
    }

    #[test]
    fn test_invalid_theme_name_message_quotes_input() {
        let err = InvalidThemeName("sepia".to_string());
        assert_eq!(err.to_string(), "Invalid theme name: \"sepia\"");
    }
}
