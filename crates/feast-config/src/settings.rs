//! Settings file schema (feast.toml, ~/.feast/config.toml)
//!
//! Both the global and the project file use the same schema. Every field is
//! optional so that a later file only overrides what it mentions.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Library name used when no configuration names one.
pub const DEFAULT_LIBRARY_NAME: &str = "FSToolbox";

/// Contents of one settings file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FeastSettings {
    /// Native library location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibrarySettings>,

    /// Pre-call validation switches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionSettings>,
}

/// Where to find the native module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LibrarySettings {
    /// Short name ("FSToolbox" -> libFSToolbox.so) or an absolute path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Extra directories searched before the platform defaults
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,
}

/// Validation performed before a native call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SelectionSettings {
    /// Refuse label columns holding a single distinct value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_constant_labels: Option<bool>,
}

impl FeastSettings {
    /// Load settings from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate field values that serde cannot check
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(library) = &self.library {
            if let Some(name) = &library.name {
                if name.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "library.name".to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
            }
            if library.search_paths.iter().any(|p| p.as_os_str().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: "library.search_paths".to_string(),
                    reason: "entries must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the global settings path (~/.feast/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".feast").join("config.toml"))
    }

    /// Configured library name, if any
    pub fn library_name(&self) -> Option<&str> {
        self.library.as_ref().and_then(|l| l.name.as_deref())
    }

    /// Configured extra search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        self.library
            .as_ref()
            .map(|l| l.search_paths.as_slice())
            .unwrap_or(&[])
    }

    /// Configured constant-label policy, if any
    pub fn reject_constant_labels(&self) -> Option<bool> {
        self.selection
            .as_ref()
            .and_then(|s| s.reject_constant_labels)
    }

    /// Merge another settings file into this one
    ///
    /// Values present in `other` win. Search paths from `other` are placed in
    /// front so they are searched first.
    pub fn merge(&mut self, other: &FeastSettings) {
        if let Some(other_lib) = &other.library {
            let lib = self.library.get_or_insert_with(Default::default);
            if other_lib.name.is_some() {
                lib.name = other_lib.name.clone();
            }
            let mut paths = other_lib.search_paths.clone();
            paths.extend(lib.search_paths.drain(..));
            lib.search_paths = paths;
        }
        if let Some(other_sel) = &other.selection {
            let sel = self.selection.get_or_insert_with(Default::default);
            if other_sel.reject_constant_labels.is_some() {
                sel.reject_constant_labels = other_sel.reject_constant_labels;
            }
        }
    }
}
