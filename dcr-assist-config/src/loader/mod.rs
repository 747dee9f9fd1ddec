pub mod bootstrap;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::accounts::{AccountConfig, AccountRegistry};
use crate::constants::{env, files};
use crate::paths::PathsConfig;

/// Root of `dcr-assist.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DcrAssistConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl DcrAssistConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse dcr-assist configuration")
    }

    pub fn account_registry(&self) -> AccountRegistry {
        AccountRegistry::from_entries(&self.accounts)
    }

    /// Applies `DCR_ASSIST_*` environment overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(env::LOCAL_DCR_V6_PATH) {
            self.paths.local_dcr_v6_path = value;
        }
        if let Ok(value) = std::env::var(env::LOCAL_DCR_V55_PATH) {
            self.paths.local_dcr_v55_path = value;
        }
        if let Ok(value) = std::env::var(env::OUTPUT_DIR) {
            self.paths.output_dir = value;
        }
    }
}

/// Loads configuration for a workspace and remembers where it came from.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: DcrAssistConfig,
    config_path: Option<PathBuf>,
    workspace: PathBuf,
}

impl ConfigManager {
    /// Looks for `dcr-assist.toml` in the workspace, then in the home config
    /// directory. Missing files yield defaults.
    pub fn load_from_workspace(workspace: impl AsRef<Path>) -> Result<Self> {
        let workspace = workspace.as_ref().to_path_buf();
        let workspace_config = workspace.join(files::CONFIG_FILE_NAME);
        if workspace_config.is_file() {
            return Self::load_from_file_in(&workspace_config, workspace);
        }

        if let Some(home_config) = bootstrap::home_config_path().filter(|path| path.is_file()) {
            return Self::load_from_file_in(&home_config, workspace);
        }

        tracing::info!(
            "No {} found for {}. Using defaults.",
            files::CONFIG_FILE_NAME,
            workspace.display()
        );
        let mut config = DcrAssistConfig::default();
        config.apply_env_overrides();
        Ok(Self {
            config,
            config_path: None,
            workspace,
        })
    }

    /// Loads an explicit configuration file. Relative paths inside it resolve
    /// against `workspace`.
    pub fn load_from_file(path: impl AsRef<Path>, workspace: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_file_in(path.as_ref(), workspace.as_ref().to_path_buf())
    }

    fn load_from_file_in(path: &Path, workspace: PathBuf) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = DcrAssistConfig::from_toml_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.apply_env_overrides();
        tracing::debug!(path = %path.display(), "loaded configuration");

        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
            workspace,
        })
    }

    pub fn config(&self) -> &DcrAssistConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}
