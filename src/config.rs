//! Configuration file handling

use crate::error::{CleanError, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Keywords used when the config does not name any
pub const DEFAULT_KEYWORDS: [&str; 4] = ["記", "件名", "宛先", "差出人"];

/// Full configuration, mirroring `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub processing: ProcessingConfig,
    pub keywords: KeywordsConfig,
}

/// `[paths]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
        }
    }
}

/// `[processing]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// WHATWG encoding label used for both reading and writing
    pub encoding: String,

    /// Copy inputs into `<input_dir>/backup` before processing
    pub backup_original: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            backup_original: true,
        }
    }
}

/// `[keywords]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeywordsConfig {
    /// Either a TOML array or one string separated by `,` or `、`
    #[serde(deserialize_with = "deserialize_keywords")]
    pub list: Vec<String>,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            list: DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordSpec {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_keywords<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let spec = KeywordSpec::deserialize(deserializer)?;
    Ok(match spec {
        KeywordSpec::List(list) => clean_keywords(list.iter().map(String::as_str)),
        KeywordSpec::Joined(joined) => clean_keywords(joined.split([',', '、'])),
    })
}

fn clean_keywords<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| CleanError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.encoding()?;
        Ok(config)
    }

    /// Load the config at `path`, writing the defaults there first if the
    /// file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| CleanError::io("Failed to read config", path, e))?;
            return Self::from_toml(&contents, path);
        }

        let config = Self::default();
        config.save(path)?;
        info!("Created default config file '{}'", path.display());
        Ok(config)
    }

    /// Write this config as pretty TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| CleanError::io("Failed to create config directory", parent, e))?;
        }
        fs::write(path, toml_str).map_err(|e| CleanError::io("Failed to write config", path, e))
    }

    /// Resolve the configured encoding label.
    ///
    /// Labels mapping to the decode-only `replacement` encoding are rejected.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label_no_replacement(self.processing.encoding.trim().as_bytes())
            .ok_or_else(|| CleanError::UnknownEncoding(self.processing.encoding.clone()))
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords.list
    }

    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.paths.input_dir.join("backup")
    }
}
