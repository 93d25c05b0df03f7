//! Tree configuration with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rbindex/rbindex.toml`
//! 3. Local config: `<dir>/.rbindex.toml`
//! 4. Environment variables: `RBINDEX_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{TreeError, TreeResult};

/// Largest `initial_capacity` accepted; bigger reservations are a config mistake.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Settings applied when a tree is constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    /// Node slots reserved up front
    pub initial_capacity: usize,
    /// Upper bound on stored keys; inserts beyond it fail without touching the tree
    pub max_nodes: Option<usize>,
    /// Run a full invariant check after every insert and erase
    pub check_invariants: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            max_nodes: None,
            check_invariants: false,
        }
    }
}

/// Partially specified config file; `None` means inherit from the layer below.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTreeConfig {
    initial_capacity: Option<usize>,
    max_nodes: Option<usize>,
    check_invariants: Option<bool>,
}

/// Get the XDG config directory for rbindex.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rbindex").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rbindex.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rbindex.toml")
}

fn config_err(e: impl std::fmt::Display) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}

fn load_raw(path: &Path) -> TreeResult<RawTreeConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl TreeConfig {
    /// Scalars from `overlay` replace ours when present.
    fn merge_with(&self, overlay: &RawTreeConfig) -> Self {
        Self {
            initial_capacity: overlay.initial_capacity.unwrap_or(self.initial_capacity),
            max_nodes: overlay.max_nodes.or(self.max_nodes),
            check_invariants: overlay.check_invariants.unwrap_or(self.check_invariants),
        }
    }

    /// Node slots to reserve up front: `initial_capacity`, capped at
    /// [`MAX_INITIAL_CAPACITY`] and at `max_nodes` when one is set.
    pub fn reserved_slots(&self) -> usize {
        let capped = self.initial_capacity.min(MAX_INITIAL_CAPACITY);
        match self.max_nodes {
            Some(limit) => capped.min(limit),
            None => capped,
        }
    }

    /// Rejects values no tree should be built from.
    fn checked(self) -> TreeResult<Self> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(TreeError::Config {
                message: format!(
                    "initial_capacity {} exceeds maximum {}",
                    self.initial_capacity, MAX_INITIAL_CAPACITY
                ),
            });
        }
        Ok(self)
    }

    /// Load configuration with layered precedence.
    ///
    /// # Arguments
    /// * `dir` - Optional directory holding a local `.rbindex.toml`
    #[instrument(level = "debug")]
    pub fn load(dir: Option<&Path>) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "applying global config");
                current = current.merge_with(&load_raw(&global_path)?);
            }
        }

        if let Some(dir) = dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!(path = %local_path.display(), "applying local config");
                current = current.merge_with(&load_raw(&local_path)?);
            }
        }

        current.apply_env_overrides()?.checked()
    }

    /// Apply RBINDEX_* environment variables as explicit overrides.
    fn apply_env_overrides(mut self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RBINDEX")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("initial_capacity") {
            self.initial_capacity = val;
        }
        if let Ok(val) = config.get::<usize>("max_nodes") {
            self.max_nodes = Some(val);
        }
        if let Ok(val) = config.get_bool("check_invariants") {
            self.check_invariants = val;
        }
        Ok(self)
    }

    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> TreeResult<Self> {
        let config: Self = toml::from_str(content).map_err(config_err)?;
        config.checked()
    }

    pub fn to_toml(&self) -> TreeResult<String> {
        toml::to_string_pretty(self).map_err(config_err)
    }
}
