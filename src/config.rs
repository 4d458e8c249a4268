use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::utils::{get_data_dir, trim_line};

pub const API_KEY_ENV: &str = "GEMINI_TTS_API_KEY";
pub const ADDON_ID: &str = "gemini_tts";

const CONFIG_FILE_NAME: &str = "config.json";

/// The add-on's persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl AddonConfig {
    pub fn with_api_key(api_key: &str) -> Self {
        Self {
            api_key: trim_line(api_key).map(str::to_string),
        }
    }

    /// The stored key; blank values count as not configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().and_then(trim_line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    ConfigFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::ConfigFile => "local config file",
        }
    }
}

#[derive(Debug)]
pub struct ApiKeyLookup {
    pub api_key: Option<String>,
    pub source: Option<ApiKeySource>,
}

/// Every add-on namespace in the file, kept as raw JSON so foreign entries survive a save.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(flatten)]
    addons: BTreeMap<String, Value>,
}

/// JSON config file holding one object per add-on id.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn open_default() -> Result<Self> {
        let data_dir = get_data_dir()?;
        Ok(Self::at(data_dir.join(CONFIG_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self, addon: &str) -> Result<Option<AddonConfig>> {
        let Some(file) = read_config_file(&self.path)? else {
            return Ok(None);
        };
        let Some(entry) = file.addons.get(addon) else {
            return Ok(None);
        };

        let config = serde_json::from_value(entry.clone()).with_context(|| {
            format!(
                "Invalid settings for {} in {}",
                addon,
                self.path.display()
            )
        })?;
        Ok(Some(config))
    }

    /// Replaces the add-on's whole entry; other add-ons are untouched.
    pub fn save(&self, addon: &str, config: &AddonConfig) -> Result<()> {
        let mut file = read_config_file(&self.path)?.unwrap_or_default();
        file.addons
            .insert(addon.to_string(), serde_json::to_value(config)?);
        write_config_file(&self.path, &file)?;
        debug!(path = %self.path.display(), addon, "saved add-on config");
        Ok(())
    }

    pub fn clear(&self, addon: &str) -> Result<bool> {
        let Some(mut file) = read_config_file(&self.path)? else {
            return Ok(false);
        };

        if file.addons.remove(addon).is_none() {
            return Ok(false);
        }

        if file.addons.is_empty() {
            fs::remove_file(&self.path).with_context(|| {
                format!(
                    "Failed to remove empty config file at {}",
                    self.path.display()
                )
            })?;
            return Ok(true);
        }

        write_config_file(&self.path, &file)?;
        Ok(true)
    }

    pub fn lookup_api_key(&self) -> Result<ApiKeyLookup> {
        self.lookup_api_key_with(env::var(API_KEY_ENV).ok())
    }

    fn lookup_api_key_with(&self, env_value: Option<String>) -> Result<ApiKeyLookup> {
        // 1. Environment variable
        if let Some(value) = env_value.as_deref().and_then(trim_line) {
            return Ok(ApiKeyLookup {
                api_key: Some(value.to_string()),
                source: Some(ApiKeySource::Environment),
            });
        }

        // 2. Config file
        let key = self
            .load(ADDON_ID)?
            .and_then(|config| config.api_key().map(str::to_string));

        Ok(ApiKeyLookup {
            source: key.as_ref().map(|_| ApiKeySource::ConfigFile),
            api_key: key,
        })
    }
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(parse_config_contents(&contents, path)?)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read config file at {}", path.display()))
        }
    }
}

fn write_config_file(path: &Path, value: &ConfigFile) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let contents = serialize_config(value)?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write config file at {}", path.display()))?;
    Ok(())
}

fn parse_config_contents(contents: &str, path: &Path) -> Result<ConfigFile> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))
}

fn serialize_config(value: &ConfigFile) -> Result<String> {
    let contents = serde_json::to_string_pretty(value)?;
    Ok(format!("{}\n", contents))
}
