//! Configuration for the operations layer.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// Configuration for Archwire operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Folder used by the persistent store.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Whether graph builds include structural port-type edges by
    /// default. Wire edges are always included.
    #[serde(default)]
    pub include_type_edges: bool,

    /// Maximum number of candidates a compatible-port scan returns.
    #[serde(default = "default_max_port_matches")]
    pub max_port_matches: usize,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(archwire_store::STORE_DIR)
}

fn default_max_port_matches() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            include_type_edges: false,
            max_port_matches: default_max_port_matches(),
        }
    }
}

impl Config {
    /// Load configuration from disk with environment overrides.
    pub fn load() -> OpsResult<Self> {
        let mut config = if let Some(path) = Self::config_file_path() {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| OpsError::Internal {
                        message: format!("failed to read config: {e}"),
                    })?;
                serde_json::from_str(&contents).map_err(|e| OpsError::Internal {
                    message: format!("failed to parse config: {e}"),
                })?
            } else {
                Self::default()
            }
        } else {
            Self::default()
        };

        if let Ok(dir) = std::env::var("ARCHWIRE_STORE_DIR") {
            config.store_dir = PathBuf::from(dir);
        }
        if let Ok(flag) = std::env::var("ARCHWIRE_TYPE_EDGES") {
            config.include_type_edges = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> OpsResult<()> {
        if let Some(path) = Self::config_file_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| OpsError::Internal {
                    message: format!("failed to create config dir: {e}"),
                })?;
            }
            let contents = serde_json::to_string_pretty(self).map_err(|e| OpsError::Internal {
                message: format!("failed to serialize config: {e}"),
            })?;
            std::fs::write(&path, contents).map_err(|e| OpsError::Internal {
                message: format!("failed to write config: {e}"),
            })?;
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "archwire", "archwire")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "store_dir" => Some(self.store_dir.display().to_string()),
            "include_type_edges" => Some(self.include_type_edges.to_string()),
            "max_port_matches" => Some(self.max_port_matches.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> OpsResult<()> {
        match key {
            "store_dir" => {
                self.store_dir = PathBuf::from(value);
            }
            "include_type_edges" => {
                self.include_type_edges = value
                    .parse()
                    .map_err(|_| OpsError::validation(format!("invalid boolean: {value}")))?;
            }
            "max_port_matches" => {
                self.max_port_matches = value
                    .parse()
                    .map_err(|_| OpsError::validation(format!("invalid number: {value}")))?;
            }
            _ => {
                return Err(OpsError::validation(format!("unknown config key: {key}")));
            }
        }
        Ok(())
    }
}
