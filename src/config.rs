//! Configuration management for fieldscan using the prefer crate.
//!
//! `Config` mirrors the on-disk file (every field optional); `Settings` is
//! the resolved runtime configuration after defaults, file values and
//! environment overrides have been applied, in that order.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default OCR timeout in seconds.
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default server bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// Default Tesseract language.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Errors reading or parsing a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Explicit Tesseract executable; `None` searches `PATH`.
    pub tesseract_path: Option<PathBuf>,
    /// Tesseract language code.
    pub language: String,
    /// Upper bound on a single OCR invocation.
    pub ocr_timeout: Duration,
    /// Directory for per-request transient images.
    pub temp_dir: PathBuf,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Server bind address.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            language: DEFAULT_LANGUAGE.to_string(),
            ocr_timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
            temp_dir: std::env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// OCR backend configuration derived from these settings.
    pub fn ocr_config(&self) -> crate::ocr::OcrConfig {
        crate::ocr::OcrConfig {
            language: self.language.clone(),
            executable: self.tesseract_path.clone(),
        }
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the tesseract executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_path: Option<String>,
    /// Tesseract language code (e.g., "eng").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// OCR timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_timeout_secs: Option<u64>,
    /// Directory for transient images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,
    /// Maximum upload size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    /// Server bind address (port, host, or host:port).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers fieldscan config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("fieldscan").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        let config = match ext {
            "toml" => toml::from_str(contents)?,
            "yaml" | "yml" => serde_yaml::from_str(contents)?,
            _ => serde_json::from_str(contents)?,
        };
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref tesseract) = self.tesseract_path {
            settings.tesseract_path = Some(resolve_executable_path(tesseract, |p| {
                self.resolve_path(p, base_dir)
            }));
        }
        if let Some(ref language) = self.language {
            settings.language = language.clone();
        }
        if let Some(secs) = self.ocr_timeout_secs {
            settings.ocr_timeout = Duration::from_secs(secs);
        }
        if let Some(ref temp_dir) = self.temp_dir {
            settings.temp_dir = self.resolve_path(temp_dir, base_dir);
        }
        if let Some(max) = self.max_upload_bytes {
            settings.max_upload_bytes = max;
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
    }
}

/// A bare executable name (no separator) is kept for `PATH` lookup;
/// anything path-like is resolved.
fn resolve_executable_path(value: &str, resolve: impl Fn(&str) -> PathBuf) -> PathBuf {
    if value.contains(std::path::MAIN_SEPARATOR) || value.contains('/') || value.starts_with('~')
    {
        resolve(value)
    } else {
        PathBuf::from(value)
    }
}

/// Environment variable overrides, read once.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub tesseract_path: Option<String>,
    pub language: Option<String>,
    pub ocr_timeout_secs: Option<u64>,
    pub temp_dir: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub bind: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        let parse_num = |key: &str| {
            get(key).and_then(|v| match v.trim().parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => {
                    tracing::warn!("Ignoring invalid {}={}", key, v);
                    None
                }
            })
        };

        Self {
            tesseract_path: get("FIELDSCAN_TESSERACT"),
            language: get("FIELDSCAN_LANGUAGE"),
            ocr_timeout_secs: parse_num("FIELDSCAN_OCR_TIMEOUT_SECS").map(|n| n as u64),
            temp_dir: get("FIELDSCAN_TEMP_DIR"),
            max_upload_bytes: parse_num("FIELDSCAN_MAX_UPLOAD_BYTES"),
            bind: get("FIELDSCAN_BIND"),
        }
    }

    /// Apply overrides on top of file-derived settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref tesseract) = self.tesseract_path {
            tracing::debug!("Using FIELDSCAN_TESSERACT from environment: {}", tesseract);
            settings.tesseract_path = Some(resolve_executable_path(tesseract, |p| {
                PathBuf::from(shellexpand::tilde(p).as_ref())
            }));
        }
        if let Some(ref language) = self.language {
            settings.language = language.clone();
        }
        if let Some(secs) = self.ocr_timeout_secs {
            settings.ocr_timeout = Duration::from_secs(secs);
        }
        if let Some(ref temp_dir) = self.temp_dir {
            settings.temp_dir = PathBuf::from(shellexpand::tilde(temp_dir).as_ref());
        }
        if let Some(max) = self.max_upload_bytes {
            settings.max_upload_bytes = max;
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> anyhow::Result<(Settings, Config)> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?,
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let settings = resolve_settings(&config, &EnvOverrides::from_env());
    Ok((settings, config))
}

/// Combine defaults, file config and environment overrides.
pub fn resolve_settings(config: &Config, env: &EnvOverrides) -> Settings {
    let mut settings = Settings::default();

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    config.apply_to_settings(&mut settings, &base_dir);
    env.apply_to_settings(&mut settings);
    settings
}
