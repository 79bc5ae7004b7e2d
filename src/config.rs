// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_timeout() -> u64 {
    15
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_cash_reserves() -> Decimal {
    Decimal::new(50_000, 0)
}

/// Runtime settings. Read from `config.json` in the platform config dir, then
/// overridden by `FINMATE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Local SQLite path; defaults to the platform data dir.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// When set, records live on the managed platform instead of locally.
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub llm_url: Option<String>,
    #[serde(default)]
    pub llm_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,
    /// Cash on hand used for the business runway estimate.
    #[serde(default = "default_cash_reserves")]
    pub cash_reserves: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: None,
            backend_url: None,
            api_key: None,
            llm_url: None,
            llm_key: None,
            request_timeout_secs: default_timeout(),
            llm_timeout_secs: default_llm_timeout(),
            cash_reserves: default_cash_reserves(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = crate::db::project_dirs()?;
    Ok(proj.config_dir().join("config.json"))
}

impl Config {
    pub fn load() -> Result<Config> {
        let path = config_path()?;
        let mut cfg = Config::from_file(&path)?;
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Missing file means defaults.
    pub fn from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Parse config {}", path.display()))
    }

    pub fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(v) = non_empty("FINMATE_DB") {
            self.db_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty("FINMATE_BACKEND_URL") {
            self.backend_url = Some(v);
        }
        if let Some(v) = non_empty("FINMATE_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = non_empty("FINMATE_LLM_URL") {
            self.llm_url = Some(v);
        }
        if let Some(v) = non_empty("FINMATE_LLM_KEY") {
            self.llm_key = Some(v);
        }
        if let Some(v) = non_empty("FINMATE_CASH_RESERVES") {
            self.cash_reserves = crate::utils::parse_decimal(&v)
                .context("FINMATE_CASH_RESERVES must be a decimal amount")?;
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Create config dir {}", parent.display()))?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Write config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config {
            llm_url: Some("http://file".into()),
            ..Config::default()
        };
        let env: HashMap<&str, &str> = [
            ("FINMATE_LLM_URL", "http://env"),
            ("FINMATE_CASH_RESERVES", "1200.50"),
            ("FINMATE_BACKEND_URL", "  "),
        ]
        .into_iter()
        .collect();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.llm_url.as_deref(), Some("http://env"));
        assert_eq!(cfg.cash_reserves, Decimal::new(120050, 2));
        assert!(cfg.backend_url.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"llm_url": "http://x"}"#).unwrap();
        assert_eq!(cfg.request_timeout_secs, 15);
        assert_eq!(cfg.cash_reserves, Decimal::new(50_000, 0));
    }
}
