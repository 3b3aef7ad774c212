use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::scaffold::BinaryExtensions;

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub scaffold: ScaffoldConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Empty means "platform default".
    #[serde(default)]
    pub plugins_dir: String,
    pub default_project_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ScaffoldConfig {
    pub binary_extensions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UiConfig {
    pub tick_ms: u64,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;

        if let Some(proj_dirs) = project_dirs() {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let user_str = fs::read_to_string(&config_path)?;
                config = Self::from_toml(&user_str)
                    .map_err(|err| anyhow!("{}: {err}", config_path.display()))?;
            }
        }

        // Expand ~ in plugins_dir
        if config.general.plugins_dir.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.general.plugins_dir =
                config
                    .general
                    .plugins_dir
                    .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        if !self.general.plugins_dir.trim().is_empty() {
            return PathBuf::from(&self.general.plugins_dir);
        }

        project_dirs()
            .map(|d| d.config_dir().join("plugins"))
            .filter(|dir| dir.is_dir())
            .or_else(bundled_plugins_dir)
            .unwrap_or_else(|| PathBuf::from("plugins"))
    }

    pub fn binary_extensions(&self) -> BinaryExtensions {
        BinaryExtensions::new(&self.scaffold.binary_extensions)
    }
}

pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "servante")
}

/// `plugins/` shipped next to the executable, or in the source tree for
/// builds run out of the workspace.
fn bundled_plugins_dir() -> Option<PathBuf> {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("plugins")));

    beside_exe
        .into_iter()
        .chain(std::iter::once(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("plugins"),
        ))
        .find(|dir| dir.is_dir())
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
