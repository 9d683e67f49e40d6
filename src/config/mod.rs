//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `ROOMLENS_*` environment variables.
//! Prompt decomposition reads its own variables, see
//! [`DecomposerConfig`](crate::decompose::DecomposerConfig).

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TOP_N, round_to};
use crate::embedding::ClipConfig;
use crate::narrative::NarratorConfig;
use crate::scoring::TierThresholds;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ROOMLENS_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory for uploaded images. Default: `./uploads`.
    pub upload_dir: PathBuf,

    /// CLIP model directory (`model.safetensors` + `tokenizer.json`).
    /// Unset runs the stub embedder.
    pub model_dir: Option<PathBuf>,

    /// Max request body size for uploads. Default: 16 MiB.
    pub max_upload_bytes: usize,

    /// Feature tier cut points. Default: `0.45` / `0.25`.
    pub thresholds: TierThresholds,

    /// Max features listed per explanation section. Default: `3`.
    pub top_n: usize,

    /// JSON snapshot of users and matches. Default: `./roomlens-history.json`.
    /// A blank `ROOMLENS_DATA_FILE` keeps history in memory only.
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            upload_dir: PathBuf::from("./uploads"),
            model_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            thresholds: TierThresholds::default(),
            top_n: DEFAULT_TOP_N,
            data_file: Some(PathBuf::from("./roomlens-history.json")),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "ROOMLENS_PORT";
    const ENV_BIND_ADDR: &'static str = "ROOMLENS_BIND_ADDR";
    const ENV_UPLOAD_DIR: &'static str = "ROOMLENS_UPLOAD_DIR";
    const ENV_MODEL_DIR: &'static str = "ROOMLENS_MODEL_DIR";
    const ENV_MAX_UPLOAD_BYTES: &'static str = "ROOMLENS_MAX_UPLOAD_BYTES";
    const ENV_STRONG_THRESHOLD: &'static str = "ROOMLENS_STRONG_THRESHOLD";
    const ENV_PARTIAL_THRESHOLD: &'static str = "ROOMLENS_PARTIAL_THRESHOLD";
    const ENV_TOP_N: &'static str = "ROOMLENS_TOP_N";
    const ENV_DATA_FILE: &'static str = "ROOMLENS_DATA_FILE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let upload_dir = Self::parse_path_from_env(Self::ENV_UPLOAD_DIR, defaults.upload_dir);
        let model_dir = Self::parse_optional_path_from_env(Self::ENV_MODEL_DIR);
        let max_upload_bytes =
            Self::parse_number_from_env(Self::ENV_MAX_UPLOAD_BYTES, defaults.max_upload_bytes)?;
        let thresholds = TierThresholds {
            strong: Self::parse_number_from_env(
                Self::ENV_STRONG_THRESHOLD,
                defaults.thresholds.strong,
            )?,
            partial: Self::parse_number_from_env(
                Self::ENV_PARTIAL_THRESHOLD,
                defaults.thresholds.partial,
            )?,
        };
        let top_n = Self::parse_number_from_env(Self::ENV_TOP_N, defaults.top_n)?;
        let data_file = match env::var(Self::ENV_DATA_FILE) {
            Ok(_) => Self::parse_optional_path_from_env(Self::ENV_DATA_FILE),
            Err(_) => defaults.data_file,
        };

        Ok(Self {
            port,
            bind_addr,
            upload_dir,
            model_dir,
            max_upload_bytes,
            thresholds,
            top_n,
            data_file,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.exists() && !self.upload_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.upload_dir.clone(),
            });
        }

        if let Some(ref path) = self.data_file
            && path.is_dir()
        {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_DATA_FILE,
                value: path.display().to_string(),
            });
        }

        if let Some(ref path) = self.model_dir {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if !self.thresholds.is_ordered() {
            return Err(ConfigError::InvalidThresholds {
                strong: self.thresholds.strong,
                partial: self.thresholds.partial,
            });
        }

        if self.top_n == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_N,
                value: "0".to_string(),
            });
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_UPLOAD_BYTES,
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// CLIP config for `model_dir`, or the stub config if unset.
    pub fn clip_config(&self) -> ClipConfig {
        self.model_dir
            .as_ref()
            .map(ClipConfig::from_dir)
            .unwrap_or_else(ClipConfig::stub)
    }

    /// Narrator settings derived from the tier thresholds and `top_n`.
    ///
    /// The overall-score bands follow the feature thresholds (in percent).
    pub fn narrator_config(&self) -> NarratorConfig {
        NarratorConfig {
            strong_score: round_to(f64::from(self.thresholds.strong) * 100.0, 4),
            moderate_score: round_to(f64::from(self.thresholds.partial) * 100.0, 4),
            top_n: self.top_n,
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_number_from_env<T: std::str::FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: var_name,
                    value,
                }),
            Err(_) => Ok(default),
        }
    }
}
