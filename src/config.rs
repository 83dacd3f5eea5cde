use std::path::Path;

use anyhow::anyhow;
use serde::Deserialize;

pub const DEFAULT_DELIMITER: &str = ";";

/// Optional settings read from a TOML file. Command-line flags take precedence.
///
/// ```toml
/// delimiter = ";"
/// multisite = false
/// json = true
/// pretty = true
/// ```
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub delimiter: Option<String>,
    /// Answer to the multisite question; asked interactively when unset.
    pub multisite: Option<bool>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
}

impl Config {
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|err| anyhow!("Failed to parse TOML config due to error: {}", err))?;
        if config.delimiter.as_deref() == Some("") {
            return Err(anyhow!("The statement delimiter cannot be empty"));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .map_err(|_| anyhow!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&toml_str)
            .map_err(|err| anyhow!("{} (in {})", err, path.display()))
    }

    pub fn delimiter(&self) -> &str {
        self.delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER)
    }
}
