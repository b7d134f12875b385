//! Configuration for the timewarden client.
//!
//! A single TOML file (backend URL, TLS, timeout, theme) merged with
//! `TIMEWARDEN_`-prefixed environment overrides, plus the state-dir
//! path where the session token is persisted between runs. The token
//! and the theme preference are the only two pieces of durable
//! client-side state.

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Theme ───────────────────────────────────────────────────────────

/// UI color theme. Persisted so the choice survives restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL, including the API prefix.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Accept invalid TLS certificates (self-signed backends).
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            insecure: false,
            timeout: default_timeout(),
            theme: Theme::default(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:5000/api".into()
}

fn default_timeout() -> u64 {
    30
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "timewarden", "timewarden")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where the session token file lives between runs.
pub fn token_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("token"),
        |dirs| dirs.data_local_dir().join("token"),
    )
}

/// Directory for log files. The TUI owns the terminal, so tracing
/// output goes to a file here instead of stdout.
pub fn log_dir() -> PathBuf {
    project_dirs().map_or_else(|| dirs_fallback().join("logs"), |dirs| {
        dirs.data_local_dir().join("logs")
    })
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("timewarden");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path (used by tests).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TIMEWARDEN_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist or is bad.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
