//! Settings
//!
//! Process-wide configuration resolved once at startup and passed into
//! components explicitly. Sources, lowest precedence first: built-in
//! defaults, an optional `config.toml` under the platform config
//! directory, then `LAMINA_*` environment variables (`__` separates
//! nested keys, e.g. `LAMINA_LOGGING__LEVEL`).

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Default layer registry endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.lamina.dev";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Default bearer token for the layer registry (`LAMINA_TOKEN`).
    pub token: Option<String>,

    /// Feature flag for the `stack` command group
    /// (`LAMINA_FF_CLOUDFORMATION`); any non-empty value enables it.
    pub ff_cloudformation: Option<String>,

    /// Layer registry base URL override.
    pub api_base_url: Option<String>,

    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from the config file (if present) and environment.
    pub fn load() -> Result<Self, ApiError> {
        let mut builder = Config::builder();
        if let Some(path) = Self::config_file_path() {
            builder = builder.add_source(File::from(path).required(false));
        }
        let builder = builder.add_source(Environment::with_prefix("LAMINA").separator("__"));
        let config = builder
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to load settings: {}", e)))?;
        config
            .try_deserialize()
            .map_err(|e| ApiError::ConfigError(format!("Invalid settings: {}", e)))
    }

    /// Platform config file location (~/.config/lamina/config.toml on
    /// Linux).
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "lamina", "lamina")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Whether the `stack` command group is enabled.
    pub fn cloudformation_enabled(&self) -> bool {
        self.ff_cloudformation
            .as_deref()
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// Resolve the token for registry-backed commands: CLI flag first,
    /// then the configured default.
    pub fn token_or(&self, cli_token: Option<&str>) -> Result<String, ApiError> {
        cli_token
            .map(|t| t.to_string())
            .or_else(|| self.token.clone())
            .ok_or_else(|| {
                ApiError::ConfigError(
                    "No token provided. Pass --token or set LAMINA_TOKEN.".to_string(),
                )
            })
    }

    /// Layer registry base URL, with the default applied.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Ambient AWS region, used where only the registry is contacted and
    /// no SDK client is constructed.
    pub fn aws_region() -> Option<String> {
        std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .ok()
            .filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(content: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_disable_cloudformation() {
        let settings = Settings::default();
        assert!(!settings.cloudformation_enabled());
        assert_eq!(settings.api_base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn any_nonempty_flag_value_enables_cloudformation() {
        let mut settings = Settings::default();
        settings.ff_cloudformation = Some("1".to_string());
        assert!(settings.cloudformation_enabled());
        settings.ff_cloudformation = Some(String::new());
        assert!(!settings.cloudformation_enabled());
    }

    #[test]
    fn cli_token_overrides_configured_default() {
        let mut settings = Settings::default();
        settings.token = Some("from-env".to_string());
        assert_eq!(settings.token_or(Some("from-cli")).unwrap(), "from-cli");
        assert_eq!(settings.token_or(None).unwrap(), "from-env");
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let settings = Settings::default();
        assert!(matches!(
            settings.token_or(None),
            Err(ApiError::ConfigError(_))
        ));
    }

    #[test]
    fn file_source_populates_nested_logging_config() {
        let settings = from_toml(
            r#"
            token = "tok_123"
            api_base_url = "https://registry.example.com"

            [logging]
            level = "debug"
            format = "json"
            "#,
        );
        assert_eq!(settings.token.as_deref(), Some("tok_123"));
        assert_eq!(settings.api_base_url(), "https://registry.example.com");
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, "json");
    }
}
