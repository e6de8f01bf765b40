use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

use crate::segmentation::SegmentationConfig;

pub const CUT_ENV: &str = "SPURTWALL_CUT_MS";
pub const PARAGRAPH_ENV: &str = "SPURTWALL_PARAGRAPH_MS";

/// Startup settings. Read once; nothing is written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub cut_threshold_ms: u64,
    pub paragraph_threshold_ms: u64,
    /// `error`, `warn`, `info`, `debug` or `trace`. `RUST_LOG` still wins.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let config = SegmentationConfig::default();
        Self {
            cut_threshold_ms: config.cut_threshold_ms,
            paragraph_threshold_ms: config.paragraph_threshold_ms,
            log_level: "info".into(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Applies `SPURTWALL_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Values that fail to parse are skipped.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = parse_override(&lookup, CUT_ENV) {
            self.cut_threshold_ms = value;
        }
        if let Some(value) = parse_override(&lookup, PARAGRAPH_ENV) {
            self.paragraph_threshold_ms = value;
        }
        self
    }

    pub fn segmentation(&self) -> SegmentationConfig {
        SegmentationConfig::new(self.cut_threshold_ms, self.paragraph_threshold_ms)
    }

    pub fn log_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

fn parse_override(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring {}={:?}: {}", key, raw, err);
            None
        }
    }
}
