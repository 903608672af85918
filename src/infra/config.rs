use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::mcp::ServerIdentity;

pub const DEFAULT_CONFIG_FILE: &str = "rednote.toml";

pub struct Config {
    pub mode: String, // "server" or "stdio"
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let mode = std::env::var("MODE").unwrap_or_else(|_| "server".into());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        Self { mode, port }
    }
}

/// Settings for the remote extraction service behind the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub retries: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            // Browser-backed extraction is slow.
            timeout_ms: 30_000,
            connect_timeout_ms: 2_000,
            retries: 2,
        }
    }
}

/// File + environment configuration. Env vars win over the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerIdentity,
    pub fetcher: FetcherConfig,
}

impl AppConfig {
    /// Load from `CONFIG_PATH` (or `rednote.toml` when it exists), then
    /// apply `REDNOTE_*` overrides.
    pub fn from_env_and_toml() -> anyhow::Result<Self> {
        let path = match std::env::var("CONFIG_PATH") {
            Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p)),
            _ => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };
        let mut cfg = match path {
            Some(p) => Self::from_toml_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        Self::from_toml_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(base) = std::env::var("REDNOTE_BASE_URL") {
            self.fetcher.base_url = Some(base);
        }
        if let Ok(v) = std::env::var("REDNOTE_TIMEOUT_MS") {
            self.fetcher.timeout_ms = v
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid REDNOTE_TIMEOUT_MS: {v}"))?;
        }
        if let Ok(v) = std::env::var("REDNOTE_RETRIES") {
            self.fetcher.retries = v
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid REDNOTE_RETRIES: {v}"))?;
        }
        Ok(())
    }

    /// Configured extraction service URL, ignoring blank values.
    pub fn base_url(&self) -> Option<&str> {
        self.fetcher
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
