//! Configuration management for hostel-admin.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ReportRange;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "hostel-admin";

/// Default token file name.
const TOKEN_FILE_NAME: &str = "admin_token";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HOSTEL_ADMIN_`, sections split on `__`)
/// 2. TOML config file at `~/.config/hostel-admin/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote service configuration.
    pub api: ApiConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Report export configuration.
    pub report: ReportConfig,
}

/// Remote service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the report service.
    pub base_url: String,
    /// Per-request timeout in seconds. Set to 0 to wait indefinitely.
    pub timeout_secs: u64,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Admin token to use instead of the token file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Path to the token file.
    /// Defaults to `~/.local/share/hostel-admin/admin_token`
    pub token_path: Option<PathBuf>,
    /// Username whose token unlocks form deletion in the dashboard.
    pub privileged_username: String,
}

/// Report export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Range used when none is given on the command line.
    pub default_range: ReportRange,
    /// Directory downloaded reports are written to.
    /// Defaults to the current directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 0,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_path: None,
            privileged_username: "Paul".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_range: ReportRange::Weekly,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&config_file))
                .merge(Env::prefixed("HOSTEL_ADMIN_").split("__")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("api.base_url must be an http(s) URL, got '{base}'"),
            });
        }

        if self.auth.privileged_username.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "auth.privileged_username cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim().trim_end_matches('/')
    }

    /// Get the token file path, resolving defaults if not set.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.auth
            .token_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(TOKEN_FILE_NAME))
    }

    /// Get the report output directory, resolving defaults if not set.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.report
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the request timeout, if one is configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        if self.api.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.api.timeout_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.auth.privileged_username, "Paul");
        assert!(config.auth.token.is_none());
        assert_eq!(config.report.default_range, ReportRange::Weekly);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost:5000".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api.base_url"));
    }

    #[test]
    fn test_validate_rejects_blank_privileged_username() {
        let mut config = Config::default();
        config.auth.privileged_username = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("privileged_username"));
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "https://reports.example.org/".to_string();
        assert_eq!(config.base_url(), "https://reports.example.org");
    }

    #[test]
    fn test_token_path_default() {
        let path = Config::default().token_path();
        assert!(path.to_string_lossy().contains("hostel-admin"));
        assert!(path.to_string_lossy().ends_with("admin_token"));
    }

    #[test]
    fn test_token_path_custom() {
        let mut config = Config::default();
        config.auth.token_path = Some(PathBuf::from("/tmp/token"));
        assert_eq!(config.token_path(), PathBuf::from("/tmp/token"));
    }

    #[test]
    fn test_output_dir_default() {
        assert_eq!(Config::default().output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_timeout() {
        let mut config = Config::default();
        assert!(config.timeout().is_none());

        config.api.timeout_secs = 15;
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("hostel-admin"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.api, ApiConfig::default());
            assert_eq!(config.report, ReportConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml_and_defaults() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "config.toml",
                r#"
                [api]
                base_url = "https://toml.example"
                timeout_secs = 30

                [auth]
                privileged_username = "Warden"
                "#,
            )?;
            jail.set_env("HOSTEL_ADMIN_API__BASE_URL", "https://env.example");
            jail.set_env("HOSTEL_ADMIN_AUTH__PRIVILEGED_USERNAME", "Matron");

            let config =
                Config::load_from(Some(PathBuf::from("config.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.base_url(), "https://env.example");
            assert_eq!(config.auth.privileged_username, "Matron");
            // Untouched by env, so the file wins over the default.
            assert_eq!(config.api.timeout_secs, 30);
            // Set nowhere, so the default stands.
            assert_eq!(config.report.default_range, ReportRange::Weekly);
            Ok(())
        });
    }

    #[test]
    fn test_env_override_without_config_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("HOSTEL_ADMIN_REPORT__DEFAULT_RANGE", "yearly");
            jail.set_env("HOSTEL_ADMIN_API__TIMEOUT_SECS", "5");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.report.default_range, ReportRange::Yearly);
            assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
            assert_eq!(config.base_url(), "http://localhost:5000");
            Ok(())
        });
    }

    #[test]
    fn test_env_override_is_validated() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("HOSTEL_ADMIN_API__BASE_URL", "ftp://reports.example");

            let result = Config::load_from(Some(PathBuf::from("missing.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_unprefixed_env_is_ignored() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("API__BASE_URL", "https://other.example");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.base_url(), "http://localhost:5000");
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [api]
            base_url = "https://reports.example.org"

            [auth]
            privileged_username = "Warden"

            [report]
            default_range = "monthly"
            "#,
        )
        .unwrap();

        let config = Config::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&path)),
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://reports.example.org");
        assert_eq!(config.auth.privileged_username, "Warden");
        assert_eq!(config.report.default_range, ReportRange::Monthly);
    }

    #[test]
    fn test_invalid_toml_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[report]\ndefault_range = \"daily\"\n").unwrap();

        let result = Config::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&path)),
        );
        assert!(matches!(result, Err(Error::ConfigLoad(_))));
    }

    #[test]
    fn test_token_is_not_serialized_when_absent() {
        let json = serde_json::to_string(&AuthConfig::default()).unwrap();
        assert!(!json.contains("\"token\""));
        assert!(json.contains("privileged_username"));
    }
}
