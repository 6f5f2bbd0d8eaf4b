use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub summaries_dir: PathBuf, // One subdirectory per dataset
    pub coordinates: PathBuf,
    pub country_mapping: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            summaries_dir: PathBuf::from("content/summaries"),
            coordinates: PathBuf::from("content/region_codes_to_coordinates.yaml"),
            country_mapping: PathBuf::from("country_mapping.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub choropleth: PathBuf,
    pub scatter: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            choropleth: PathBuf::from("output/choropleth_map.json"),
            scatter: PathBuf::from("output/scatter_map.geojson"),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML configuration: {:?}", path))?;
        Ok(config)
    }

    /// Like `load_from_file`, but a config file that does not exist is not an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }
}
