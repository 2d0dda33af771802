use serde::{Deserialize, Serialize};

use crate::applier::DEFAULT_TRANSITION_CLASS;
use crate::error::ThemeError;
use crate::storage::DEFAULT_STORAGE_KEY;
use crate::theme::{ThemeClasses, ThemeName};

/// Settings for one theme scope. Every field is optional in JSON.
///
/// ```json
/// { "storage_key": "docs-theme", "default_theme": "light", "theme_classes": { "dark": ["dark", "bg-night"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub storage_key: String,
    pub default_theme: ThemeName,
    pub transition_classes: Vec<String>,
    pub theme_classes: ThemeClasses,
    /// Apply the stored theme as soon as the switcher mounts.
    pub sync_on_mount: bool,
    /// `EnvFilter` directive used by [`crate::logging::init`].
    pub log_filter: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_theme: ThemeName::default(),
            transition_classes: vec![DEFAULT_TRANSITION_CLASS.to_string()],
            theme_classes: ThemeClasses::default(),
            sync_on_mount: true,
            log_filter: "info".to_string(),
        }
    }
}

impl ThemeConfig {
    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        let config: ThemeConfig = serde_json::from_str(json)
            .map_err(|e| ThemeError::Config(format!("Failed to parse theme config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ThemeError> {
        if self.storage_key.trim().is_empty() {
            return Err(ThemeError::Config("storage_key must not be empty".to_string()));
        }

        let classes = self
            .transition_classes
            .iter()
            .map(String::as_str)
            .chain(self.theme_classes.all_classes());
        for class in classes {
            // DOMTokenList rejects empty tokens and tokens with whitespace.
            if class.is_empty() || class.chars().any(char::is_whitespace) {
                return Err(ThemeError::Config(format!("Invalid class name: {:?}", class)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ThemeConfig::from_json("{}").unwrap();
        assert_eq!(config, ThemeConfig::default());
        assert_eq!(config.storage_key, "theme");
        assert_eq!(config.transition_classes, vec!["transition-colors"]);
        assert!(config.sync_on_mount);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = ThemeConfig::from_json(
            r#"{
                "storage_key": "docs-theme",
                "default_theme": "light",
                "transition_classes": ["changing-theme"],
                "theme_classes": { "dark": ["dark", "bg-night"] },
                "sync_on_mount": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.storage_key, "docs-theme");
        assert_eq!(config.default_theme, ThemeName::Light);
        assert_eq!(config.theme_classes.dark, vec!["dark", "bg-night"]);
        assert_eq!(config.theme_classes.light, vec!["light"]);
        assert!(!config.sync_on_mount);
    }

    #[test]
    fn test_unknown_default_theme_is_rejected() {
        let err = ThemeConfig::from_json(r#"{"default_theme": "sepia"}"#).unwrap_err();
        assert!(matches!(err, ThemeError::Config(_)));
    }

    #[test]
    fn test_empty_storage_key_is_rejected() {
        let err = ThemeConfig::from_json(r#"{"storage_key": "  "}"#).unwrap_err();
        assert!(err.to_string().contains("storage_key"));
    }

    #[test]
    fn test_class_with_whitespace_is_rejected() {
        let err = ThemeConfig::from_json(r#"{"theme_classes": {"light": ["light mode"]}}"#).unwrap_err();
        assert!(err.to_string().contains("light mode"));
    }
}
