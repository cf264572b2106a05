use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::options::AssetCategory;

/// Environment variable pointing at an alternative settings file
pub const CONFIG_ENV: &str = "ASSETDL_CONFIG";

/// Keys accepted by `set_value`
pub const KEYS: &[&str] = &[
    "sound_effects",
    "music",
    "videos",
    "downloads",
    "auto_import",
    "binaries_dir",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetDirectories {
    pub sound_effects: PathBuf,
    pub music: PathBuf,
    pub videos: PathBuf,
    /// Scratch directory the fetcher writes into
    pub downloads: PathBuf,
}

impl Default for AssetDirectories {
    fn default() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("assetdl")
            .join("assets");
        Self::under(&root)
    }
}

impl AssetDirectories {
    /// Standard layout below a single root directory
    pub fn under(root: &Path) -> Self {
        Self {
            sound_effects: root.join("sound-effects"),
            music: root.join("musics"),
            videos: root.join("videos"),
            downloads: root.join("downloads"),
        }
    }

    pub fn for_category(&self, category: AssetCategory) -> &Path {
        match category {
            AssetCategory::Music => &self.music,
            AssetCategory::Sfx => &self.sound_effects,
            AssetCategory::Vfx => &self.videos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub asset_directories: AssetDirectories,
    #[serde(default = "default_auto_import")]
    pub auto_import: bool,
    /// Override for the bundled binaries directory
    #[serde(default)]
    pub binaries_dir: Option<String>,
}

fn default_auto_import() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_directories: AssetDirectories::default(),
            auto_import: default_auto_import(),
            binaries_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Read settings from `path`. A missing, empty or corrupt file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data =
            fs::read(path).with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Config::default());
        }

        Ok(serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt config file {:?}: {}", path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        if let Some(custom) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(custom));
        }

        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("assetdl").join("settings.json"))
    }

    pub fn category_dir(&self, category: AssetCategory) -> &Path {
        self.asset_directories.for_category(category)
    }

    pub fn set_asset_dir(&mut self, key: &str, path: PathBuf) -> Result<()> {
        let dirs = &mut self.asset_directories;
        let slot = match key {
            "sound_effects" | "sfx" => &mut dirs.sound_effects,
            "music" => &mut dirs.music,
            "videos" | "vfx" => &mut dirs.videos,
            "downloads" => &mut dirs.downloads,
            other => bail!("Unknown asset directory '{}'", other),
        };
        *slot = path;
        Ok(())
    }

    /// Update one setting from its textual form
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "auto_import" => {
                self.auto_import = parse_bool(value)
                    .with_context(|| format!("Invalid value for auto_import: '{}'", value))?;
            }
            "binaries_dir" => {
                let trimmed = value.trim();
                self.binaries_dir = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            _ => {
                if value.trim().is_empty() {
                    bail!("Directory for '{}' cannot be empty", key);
                }
                self.set_asset_dir(key, PathBuf::from(value))?;
            }
        }
        Ok(())
    }

    pub fn binaries_dir(&self) -> Option<PathBuf> {
        self.binaries_dir.as_ref().map(PathBuf::from)
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Config::default();
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
