//! `lazybuild.toml` configuration.
//!
//! Every field has a default, so an absent file and an empty file behave the
//! same. Command-line flags override file values.

use lazybuild_core::{LazybuildError, Result, ValidationConfig};
use lazybuild_gradle::LoaderOptions;
use lazybuild_gradle::loader::DEFAULT_MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file looked up in the project directory.
pub const CONFIG_FILE: &str = "lazybuild.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazybuildConfig {
    pub validation: ValidationConfig,
    pub loader: LoaderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Scripts larger than this many bytes are rejected.
    pub max_file_size: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl LoaderConfig {
    pub const fn options(&self) -> LoaderOptions {
        LoaderOptions {
            max_file_size: self.max_file_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl LazybuildConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LazybuildError::Config(e.to_string()))
    }

    /// Loads `explicit` if given, otherwise `lazybuild.toml` in `project_dir`
    /// when it exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub async fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = project_dir.join(CONFIG_FILE);
                if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                    tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, project_dir);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LazybuildError::io(&path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LazybuildConfig::from_toml("").unwrap();
        assert_eq!(config, LazybuildConfig::default());
        assert!(!config.validation.allow_prerelease);
        assert!(!config.validation.deny_warnings);
        assert!(config.validation.require_versions);
        assert_eq!(config.loader.max_file_size, 10_000_000);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_partial_file() {
        let config = LazybuildConfig::from_toml(
            "[validation]\nallow_prerelease = true\n\n[output]\npretty = false\n",
        )
        .unwrap();
        assert!(config.validation.allow_prerelease);
        assert!(config.validation.require_versions);
        assert!(!config.output.pretty);
        assert_eq!(config.loader.options().max_file_size, 10_000_000);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = LazybuildConfig::from_toml("[registry]\nurl = \"x\"\n").unwrap_err();
        assert!(matches!(err, LazybuildError::Config(_)));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = LazybuildConfig::from_toml("[loader]\nmax_file_size = \"big\"\n").unwrap_err();
        assert!(err.to_string().contains("max_file_size"));
    }

    #[tokio::test]
    async fn test_load_from_project_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[loader]\nmax_file_size = 42\n").unwrap();

        let config = LazybuildConfig::load(None, dir.path()).await.unwrap();
        assert_eq!(config.loader.max_file_size, 42);
    }

    #[tokio::test]
    async fn test_missing_default_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = LazybuildConfig::load(None, dir.path()).await.unwrap();
        assert_eq!(config, LazybuildConfig::default());
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = LazybuildConfig::load(Some(&missing), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LazybuildError::Io { .. }));
    }
}
