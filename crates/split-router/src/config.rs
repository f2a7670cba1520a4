/// Router configuration.
///
/// Loaded from a TOML file. The split definition list is kept as raw
/// values here: split-core validates each entry individually, so one bad
/// definition degrades to "less rerouting" instead of failing the parse.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    pub output: OutputSection,
    #[serde(default)]
    pub input: InputSection,
    /// Raw `[[split]]` entries, validated by the split table compiler.
    #[serde(default)]
    pub split: Option<toml::Value>,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    /// Exact name of the virtual output port to open.
    pub virtual_name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct InputSection {
    /// Wildcard patterns for input ports that must not be attached.
    #[serde(default)]
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
    /// Raise the default log level from `info` to `debug`.
    /// Does not alter routing behavior.
    #[serde(default)]
    pub debug: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self { debug: false }
    }
}

impl RouterConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config: RouterConfig =
            toml::from_str(&raw).with_context(|| format!("failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// The split list as a JSON value for the compiler: an array when
    /// configured, `Null` when absent, and whatever else the user wrote
    /// otherwise (the compiler diagnoses non-lists itself).
    pub fn split_value(&self) -> Value {
        match &self.split {
            Some(value) => serde_json::to_value(value).unwrap_or(Value::Null),
            None => Value::Null,
        }
    }
}
