use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dsp::classify::BandThresholds;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub bands: BandThresholds,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_segment_start")]
    pub segment_start: f32,
    #[serde(default = "default_segment_duration")]
    pub segment_duration: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            segment_start: default_segment_start(),
            segment_duration: default_segment_duration(),
        }
    }
}

pub fn default_frame_size() -> usize { 1024 }
pub fn default_interval_ms() -> u64 { 50 }
pub fn default_segment_start() -> f32 { 10.0 }
pub fn default_segment_duration() -> f32 { 1.0 }

/// Explicit path first, then `./bandlight.toml`, then the per-user config.
pub fn find_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let local = PathBuf::from("bandlight.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("bandlight").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("bandlight").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    })
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
