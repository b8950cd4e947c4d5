//! Configuration Loader
//!
//! Loads settings from every source and merges them with proper precedence.

use crate::settings::{FeastSettings, DEFAULT_LIBRARY_NAME};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project settings file
pub const PROJECT_FILE_NAME: &str = "feast.toml";

/// Configuration loader
///
/// Merges, lowest priority first:
/// 1. Global settings (~/.feast/config.toml)
/// 2. Project settings (feast.toml in the start directory or an ancestor)
/// 3. Environment variables (FEAST_*)
pub struct ConfigLoader {
    /// Cached global settings path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective settings after merging
    pub settings: FeastSettings,

    /// Directory holding the feast.toml that was used
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global settings file instead of ~/.feast/config.toml
    pub fn with_global_path(path: PathBuf) -> Self {
        Self {
            global_config_path: Some(path),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find feast.toml, layers it over the
    /// global settings and applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_settings) = self.find_project_settings(start_dir)?;

        // A missing or unreadable home directory is not fatal
        let mut settings = self.load_global_settings().unwrap_or_default();
        settings.merge(&project_settings);
        let settings = self.apply_env_overrides(settings)?;

        Ok(Config {
            settings,
            project_root,
        })
    }

    /// Load configuration from a specific project settings file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_settings = FeastSettings::load_from_file(config_path)?;
        let mut settings = self.load_global_settings().unwrap_or_default();
        settings.merge(&project_settings);
        let settings = self.apply_env_overrides(settings)?;

        Ok(Config {
            settings,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project settings by walking up the directory tree
    fn find_project_settings(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, FeastSettings)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_FILE_NAME);

            if config_path.exists() {
                let settings = FeastSettings::load_from_file(&config_path)?;
                return Ok((Some(current), settings));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, FeastSettings::default())),
            }
        }
    }

    /// Load global settings, defaulting when the file does not exist
    fn load_global_settings(&mut self) -> ConfigResult<FeastSettings> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = FeastSettings::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(FeastSettings::default());
        }

        FeastSettings::load_from_file(&path)
    }

    /// Apply environment variable overrides
    ///
    /// - FEAST_LIBRARY: library name or absolute path
    /// - FEAST_LIBRARY_PATH: extra search directories (platform path separator)
    /// - FEAST_REJECT_CONSTANT_LABELS: true/1/yes enables the label check
    fn apply_env_overrides(&self, mut settings: FeastSettings) -> ConfigResult<FeastSettings> {
        if let Ok(name) = env::var("FEAST_LIBRARY") {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "FEAST_LIBRARY".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            settings.library.get_or_insert_with(Default::default).name = Some(name);
        }

        if let Some(paths) = env::var_os("FEAST_LIBRARY_PATH") {
            let library = settings.library.get_or_insert_with(Default::default);
            let mut merged: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            merged.append(&mut library.search_paths);
            library.search_paths = merged;
        }

        if let Ok(flag) = env::var("FEAST_REJECT_CONSTANT_LABELS") {
            let enabled = matches!(flag.to_lowercase().as_str(), "true" | "1" | "yes");
            settings
                .selection
                .get_or_insert_with(Default::default)
                .reject_constant_labels = Some(enabled);
        }

        Ok(settings)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective library name (configured or the FEAST default)
    pub fn library_name(&self) -> &str {
        self.settings.library_name().unwrap_or(DEFAULT_LIBRARY_NAME)
    }

    /// Extra search paths, highest priority first
    pub fn search_paths(&self) -> &[PathBuf] {
        self.settings.search_paths()
    }

    /// Whether constant label columns are refused before the native call
    pub fn reject_constant_labels(&self) -> bool {
        self.settings.reject_constant_labels().unwrap_or(true)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a feast.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_settings_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(PROJECT_FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    fn isolated_loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::with_global_path(dir.path().join("no-global.toml"))
    }

    #[test]
    #[serial]
    fn test_load_project_settings() {
        let temp_dir = TempDir::new().unwrap();
        create_settings_file(
            temp_dir.path(),
            r#"
[library]
name = "feast-test"
"#,
        );

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(temp_dir.path()).unwrap();

        assert_eq!(config.library_name(), "feast-test");
        assert!(config.is_project());
    }

    #[test]
    #[serial]
    fn test_defaults_without_any_file() {
        let temp_dir = TempDir::new().unwrap();

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(temp_dir.path()).unwrap();

        assert_eq!(config.library_name(), DEFAULT_LIBRARY_NAME);
        assert!(config.reject_constant_labels());
        assert!(!config.is_project());
    }

    #[test]
    #[serial]
    fn test_env_override_library() {
        let temp_dir = TempDir::new().unwrap();
        create_settings_file(
            temp_dir.path(),
            r#"
[library]
name = "from-file"
"#,
        );

        env::set_var("FEAST_LIBRARY", "from-env");

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(temp_dir.path()).unwrap();

        env::remove_var("FEAST_LIBRARY");

        assert_eq!(config.library_name(), "from-env");
    }

    #[test]
    #[serial]
    fn test_env_override_constant_labels() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("FEAST_REJECT_CONSTANT_LABELS", "no");

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(temp_dir.path()).unwrap();

        env::remove_var("FEAST_REJECT_CONSTANT_LABELS");

        assert!(!config.reject_constant_labels());
    }

    #[test]
    #[serial]
    fn test_global_then_project_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        fs::write(
            &global,
            r#"
[library]
name = "global-lib"
search_paths = ["/global/lib"]

[selection]
reject_constant_labels = false
"#,
        )
        .unwrap();
        let project_dir = temp_dir.path().join("project");
        fs::create_dir(&project_dir).unwrap();
        create_settings_file(
            &project_dir,
            r#"
[library]
search_paths = ["/project/lib"]
"#,
        );

        let mut loader = ConfigLoader::with_global_path(global);
        let config = loader.load_from_directory(&project_dir).unwrap();

        assert_eq!(config.library_name(), "global-lib");
        assert_eq!(
            config.search_paths(),
            &[PathBuf::from("/project/lib"), PathBuf::from("/global/lib")]
        );
        assert!(!config.reject_constant_labels());
    }
}
