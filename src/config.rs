use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::storage::StorageOptions;
use crate::wizard::{DEFAULT_DISCARD_PROMPT, DEFAULT_PATHNAME_PATTERN};

const LOG_TARGET: &str = "form_steps_wizard::config";

fn default_pathname_pattern() -> String {
    DEFAULT_PATHNAME_PATTERN.to_string()
}

fn default_discard_prompt() -> String {
    DEFAULT_DISCARD_PROMPT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Location of the wizard page; the last segment is replaced by `#<step>`
    #[serde(default = "default_pathname_pattern")]
    pub steps_pathname_pattern: String,

    /// Shown when leaving a step that has unsaved input
    #[serde(default = "default_discard_prompt")]
    pub discard_prompt: String,

    #[serde(default)]
    pub class_name: String,

    #[serde(default)]
    pub wrapper_class_name: String,

    #[serde(default)]
    pub steps_box_class_name: String,

    /// Where storage-backed state lives
    #[serde(default)]
    pub storage: StorageOptions,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            steps_pathname_pattern: default_pathname_pattern(),
            discard_prompt: default_discard_prompt(),
            class_name: String::new(),
            wrapper_class_name: String::new(),
            steps_box_class_name: String::new(),
            storage: StorageOptions::default(),
        }
    }
}

impl WizardConfig {
    /// Load configuration from the platform-specific config directory.
    /// Falls back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!(target: LOG_TARGET, "No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(target: LOG_TARGET, "No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let config = Self::from_json_str(&content).map_err(|e| match e {
            ConfigError::LoadFailed { source, .. } => ConfigError::LoadFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;

        tracing::info!(target: LOG_TARGET, "✓ Loaded wizard config from: {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::LoadFailed {
            path: "<inline>".to_string(),
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_pathname_pattern.is_empty() {
            return Err(ConfigError::Invalid(
                "steps_pathname_pattern must not be empty".to_string(),
            ));
        }
        if self.steps_pathname_pattern.contains('#') {
            return Err(ConfigError::Invalid(format!(
                "steps_pathname_pattern {:?} must not contain a fragment",
                self.steps_pathname_pattern
            )));
        }
        Ok(())
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| failed(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| failed(Box::new(e)))?;
        tracing::debug!(target: LOG_TARGET, "Saved wizard config to: {}", path.display());
        Ok(())
    }

    /// `<config dir>/FormStepsWizard/wizard.json`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("FormStepsWizard").join("wizard.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageScope;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = WizardConfig::default();
        assert_eq!(config.steps_pathname_pattern, "/<folder>/");
        assert_eq!(
            config.discard_prompt,
            "Are you sure you wish to discard unsaved changes ?"
        );
        assert!(config.class_name.is_empty());
        assert_eq!(config.storage.scope, StorageScope::Session);
        assert!(!config.storage.encrypted);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WizardConfig::from_json_str(
            r#"{"steps_pathname_pattern": "/signup/[step]", "storage": {"scope": "local"}}"#,
        )
        .unwrap();

        assert_eq!(config.steps_pathname_pattern, "/signup/[step]");
        assert_eq!(config.discard_prompt, DEFAULT_DISCARD_PROMPT);
        assert_eq!(config.storage.scope, StorageScope::Local);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            WizardConfig::from_json_str(r#"{"steps_pathname_pattern": ""}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WizardConfig::from_json_str(r#"{"steps_pathname_pattern": "/a/#b"}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WizardConfig::from_json_str("not json"),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = WizardConfig::load_from(&dir.path().join("wizard.json")).unwrap();
        assert_eq!(config, WizardConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("wizard.json");

        let config = WizardConfig {
            class_name: "wizard".to_string(),
            steps_box_class_name: "wizard__steps".to_string(),
            ..WizardConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = WizardConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_broken_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wizard.json");
        fs::write(&path, "{").unwrap();

        match WizardConfig::load_from(&path) {
            Err(ConfigError::LoadFailed { path: reported, .. }) => {
                assert!(reported.ends_with("wizard.json"));
            }
            other => panic!("expected LoadFailed, got {:?}", other),
        }
    }
}
