//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are converted into the transport's immutable settings once
//! validated.

use crate::transport::{BackoffPolicy, CompletionSettings, NetworkConfig};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("network.retry_attempts cannot be 0")]
    ZeroRetryAttempts,

    #[error("network.timeout_ms cannot be 0")]
    ZeroTimeout,

    #[error("network.base_delay_ms ({base}) cannot exceed network.max_delay_ms ({max})")]
    InvertedDelays { base: u64, max: u64 },

    #[error("network.{field} contains an invalid IP address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("provider.model cannot be empty")]
    EmptyModel,

    #[error("provider.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors that stop startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key found: set the {env} environment variable or provider.api_key")]
    MissingCredential { env: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Raw provider configuration from TOML (`[provider]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Chat-completion endpoint
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer`
    pub referer: String,
    /// Sent as `X-Title`
    pub title: String,
    pub user_agent: String,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            api_key: None,
            referer: "https://quizgen.local".to_string(),
            title: "quizgen".to_string(),
            user_agent: format!("quizgen/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Raw network configuration from TOML (`[network]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNetworkConfig {
    /// DNS servers; empty uses the system configuration
    pub resolvers: Vec<String>,
    /// Numeric addresses used when the endpoint host does not resolve
    pub fallback_addresses: Vec<String>,
    pub retry_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl Default for FileNetworkConfig {
    fn default() -> Self {
        Self {
            resolvers: vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()],
            fallback_addresses: Vec::new(),
            retry_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
            timeout_ms: 10_000,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completion provider settings
    pub provider: FileProviderConfig,
    /// DNS, retry and timeout settings
    pub network: FileNetworkConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let network = &self.network;

        if network.retry_attempts == 0 {
            return Err(ConfigValidationError::ZeroRetryAttempts);
        }

        if network.timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroTimeout);
        }

        if network.base_delay_ms > network.max_delay_ms {
            return Err(ConfigValidationError::InvertedDelays {
                base: network.base_delay_ms,
                max: network.max_delay_ms,
            });
        }

        parse_addresses("resolvers", &network.resolvers)?;
        parse_addresses("fallback_addresses", &network.fallback_addresses)?;

        if self.provider.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModel);
        }

        parse_base_url(&self.provider.base_url)?;

        Ok(())
    }

    /// Validated network settings
    pub fn network_config(&self) -> Result<NetworkConfig, ConfigValidationError> {
        self.validate()?;
        let network = &self.network;

        Ok(NetworkConfig {
            resolvers: parse_addresses("resolvers", &network.resolvers)?,
            fallback_addresses: parse_addresses(
                "fallback_addresses",
                &network.fallback_addresses,
            )?,
            retry_attempts: network.retry_attempts,
            backoff: BackoffPolicy::from_millis(network.base_delay_ms, network.max_delay_ms),
            timeout: Duration::from_millis(network.timeout_ms),
        })
    }

    /// Validated provider settings with the credential read from the
    /// process environment.
    pub fn completion_settings(&self) -> Result<CompletionSettings, ConfigError> {
        self.completion_settings_with(|name| std::env::var(name).ok())
    }

    /// Like [`completion_settings`](Self::completion_settings) with an
    /// explicit environment lookup.
    ///
    /// The `api_key_env` variable wins over a direct `api_key`.
    pub fn completion_settings_with(
        &self,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Result<CompletionSettings, ConfigError> {
        self.validate()?;
        let provider = &self.provider;

        let api_key = lookup_env(&provider.api_key_env)
            .or_else(|| provider.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                env: provider.api_key_env.clone(),
            })?;

        Ok(CompletionSettings {
            endpoint: parse_base_url(&provider.base_url)?,
            model: provider.model.trim().to_string(),
            temperature: provider.temperature,
            max_tokens: provider.max_tokens,
            api_key,
            referer: provider.referer.clone(),
            title: provider.title.clone(),
            user_agent: provider.user_agent.clone(),
        })
    }

    /// Copy safe to print, with any direct credential masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.provider.api_key.is_some() {
            config.provider.api_key = Some("<redacted>".to_string());
        }
        config
    }
}

fn parse_addresses(
    field: &'static str,
    values: &[String],
) -> Result<Vec<IpAddr>, ConfigValidationError> {
    values
        .iter()
        .map(|value| {
            value
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| ConfigValidationError::InvalidAddress {
                    field,
                    value: value.clone(),
                })
        })
        .collect()
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigValidationError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigValidationError::InvalidBaseUrl(format!("{} ({})", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigValidationError::InvalidBaseUrl(format!(
            "{} (expected an http(s) URL with a host)",
            raw
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[provider]
base_url = "https://llm.example.test/v1/chat/completions"
model = "anthropic/claude-3-haiku"
temperature = 0.2
max_tokens = 1500
api_key_env = "MY_KEY"
referer = "https://school.example"
title = "Quiz Night"

[network]
resolvers = ["9.9.9.9"]
fallback_addresses = ["104.18.2.115", "104.18.3.115"]
retry_attempts = 5
base_delay_ms = 250
max_delay_ms = 4000
timeout_ms = 30000
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.model, "anthropic/claude-3-haiku");
        assert_eq!(config.provider.max_tokens, 1500);
        assert_eq!(config.provider.api_key_env, "MY_KEY");
        assert_eq!(config.network.fallback_addresses.len(), 2);
        assert_eq!(config.network.retry_attempts, 5);

        let network = config.network_config().unwrap();
        assert_eq!(network.resolvers, vec![IpAddr::from([9, 9, 9, 9])]);
        assert_eq!(network.backoff.delay(1), Duration::from_millis(250));
        assert_eq!(network.backoff.delay(10), Duration::from_millis(4000));
        assert_eq!(network.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[network]
retry_attempts = 1
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.network.retry_attempts, 1);
        // Defaults should apply
        assert_eq!(config.network.timeout_ms, 10_000);
        assert_eq!(config.provider.model, "openai/gpt-4o-mini");
        assert_eq!(config.network.resolvers, vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn test_defaults_validate() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network_config().unwrap(), NetworkConfig::default());
    }

    #[test]
    fn test_validate_zero_retries() {
        let mut config = FileConfig::default();
        config.network.retry_attempts = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroRetryAttempts)
        );
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = FileConfig::default();
        config.network.timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroTimeout));
    }

    #[test]
    fn test_validate_inverted_delays() {
        let mut config = FileConfig::default();
        config.network.base_delay_ms = 9000;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvertedDelays {
                base: 9000,
                max: 8000
            })
        );
    }

    #[test]
    fn test_validate_bad_address() {
        let mut config = FileConfig::default();
        config.network.fallback_addresses = vec!["10.0.0.1".into(), "api.example".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidAddress {
                field: "fallback_addresses",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_empty_model_and_bad_url() {
        let mut config = FileConfig::default();
        config.provider.model = "  ".into();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyModel));

        let mut config = FileConfig::default();
        config.provider.base_url = "not a url".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidBaseUrl(_))
        ));

        config.provider.base_url = "ftp://example.test/chat".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credential() {
        let config = FileConfig::default();
        let err = config.completion_settings_with(|_| None).unwrap_err();
        match err {
            ConfigError::MissingCredential { env } => assert_eq!(env, "OPENROUTER_API_KEY"),
            other => panic!("unexpected error: {other}"),
        }

        // Blank values count as missing
        let err = config
            .completion_settings_with(|_| Some("   ".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn test_credential_sources() {
        let mut config = FileConfig::default();
        config.provider.api_key = Some("sk-file".into());

        let settings = config.completion_settings_with(|_| None).unwrap();
        assert_eq!(settings.api_key, "sk-file");

        let settings = config
            .completion_settings_with(|name| {
                (name == "OPENROUTER_API_KEY").then(|| "sk-env".to_string())
            })
            .unwrap();
        assert_eq!(settings.api_key, "sk-env");
        assert_eq!(
            settings.endpoint.as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_invalid_config_is_reported_before_credential() {
        let mut config = FileConfig::default();
        config.network.retry_attempts = 0;
        let err = config.completion_settings_with(|_| None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ConfigValidationError::ZeroRetryAttempts)
        ));
    }

    #[test]
    fn test_redacted_masks_direct_key() {
        let mut config = FileConfig::default();
        config.provider.api_key = Some("sk-secret".into());
        let shown = toml::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
