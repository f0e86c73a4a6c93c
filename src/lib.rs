// Imports
pub use color_eyre::eyre::{eyre, Result};

use clap::ValueEnum;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Reverses `s` by Unicode scalar value.
///
/// Grapheme clusters are not kept together, so a combining mark ends up in
/// front of the letter it belonged to.
pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

// Output formats
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Original and reversed text on two lines
    #[default]
    Text,
    /// Reversed text only
    Plain,
    /// Single-line JSON object
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reversal {
    pub original: String,
    pub reversed: String,
}

impl Reversal {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        let reversed = reverse(&original);
        Self { original, reversed }
    }

    /// Renders without a trailing newline
    pub fn render(&self, format: Format) -> Result<String> {
        Ok(match format {
            Format::Text => format!("Original: {}\nReversed: {}", self.original, self.reversed),
            Format::Plain => self.reversed.clone(),
            Format::Json => serde_json::to_string(self)?,
        })
    }
}

// Stored settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub text: String,
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text: String::from("Hello, World!"),
            format: Format::default(),
        }
    }
}

impl Config {
    pub fn parse(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let app_dirs = AppDirs::new(Some("revstr"), false).ok_or(eyre!("Config location is invalid"))?;
    Ok(app_dirs.config_dir.join("revstr.toml"))
}

pub fn read_config() -> Result<Config> {
    read_config_from(&config_path()?)
}

/// Missing file means defaults, anything else that goes wrong is an error
pub fn read_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(path)?;
    let config = Config::parse(&raw)?;
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}
