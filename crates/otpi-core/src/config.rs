//! Configuration management for OTPi.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Tab;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Main application configuration.
///
/// This is loaded from `~/.config/otpi/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote authentication service settings
    pub gateway: GatewayConfig,
    /// One-time code lifetime and countdown thresholds
    pub otp: OtpConfig,
    /// Front end settings
    pub ui: UiConfig,
    /// Log filter settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, using defaults if the file is absent.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `OTPI_API_BASE`: Override the authentication service base URL
    /// - `OTPI_REQUEST_TIMEOUT_SECS`: Override the per-request timeout
    /// - `OTPI_OTP_DURATION_SECS`: Override the code lifetime
    /// - `OTPI_LOG`: Override the tracing filter directive
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("OTPI_API_BASE") {
            tracing::debug!("Override gateway.base_url from env: {}", val);
            self.gateway.base_url = val;
        }

        if let Some(val) = lookup("OTPI_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.gateway.timeout_secs = secs;
                tracing::debug!("Override gateway.timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("OTPI_OTP_DURATION_SECS") {
            if let Ok(secs) = val.parse() {
                self.otp.duration_secs = secs;
                tracing::debug!("Override otp.duration_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("OTPI_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check value constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.otp.duration_secs == 0 {
            return Err(invalid("otp.duration_secs", "must be greater than zero"));
        }

        if self.otp.critical_threshold_secs > self.otp.warning_threshold_secs {
            return Err(invalid(
                "otp.critical_threshold_secs",
                "must not exceed otp.warning_threshold_secs",
            ));
        }

        if self.gateway.timeout_secs == 0 {
            return Err(invalid("gateway.timeout_secs", "must be greater than zero"));
        }

        let url = Url::parse(&self.gateway.base_url)
            .map_err(|e| invalid("gateway.base_url", &e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("gateway.base_url", "scheme must be http or https"));
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| invalid("config_path", "no parent directory"))?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/otpi/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "otpi", "otpi").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Remote authentication service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL the endpoint paths are appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 5,
            user_agent: format!("OTPi/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// One-time code settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Lifetime of a requested code in seconds
    pub duration_secs: u32,
    /// Remaining seconds at or below which the countdown turns orange
    pub warning_threshold_secs: u32,
    /// Remaining seconds at or below which the countdown turns red and pulses
    pub critical_threshold_secs: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            duration_secs: 90,
            warning_threshold_secs: 30,
            critical_threshold_secs: 10,
        }
    }
}

/// Front end settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tab shown when no remote session is active
    pub initial_tab: Tab,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,otpi=debug".to_string(),
        }
    }
}
