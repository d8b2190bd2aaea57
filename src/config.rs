//! Configuration management for CooKin.
//!
//! Configuration can be set via environment variables (a `.env` file is
//! loaded first when present):
//! - `OPENAI_API_KEY` - Optional. Credential used by the CLI. The web server ignores it
//!   and asks each session for its own key.
//! - `OPENAI_BASE_URL` - Optional. Chat-completion base URL. Defaults to `https://api.openai.com/v1`.
//! - `COOKIN_MODEL` - Optional. Model identifier. Defaults to `gpt-4o-mini`.
//! - `COOKIN_TEMPERATURE` - Optional. Sampling temperature. Defaults to `1`.
//! - `COOKIN_PROMPT_POLICY` - Optional. `graceful` or `strict`. Defaults to `graceful`.
//! - `COOKIN_MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `25`.
//! - `LLM_TIMEOUT_SECS` - Optional. Timeout for model calls. Unbounded when unset.
//! - `WEATHER_BASE_URL` - Optional. Weather service base URL. Defaults to `https://wttr.in`.
//! - `WEATHER_TIMEOUT_SECS` - Optional. Weather lookup timeout. Defaults to `5`.
//! - `SESSION_IDLE_SECS` - Optional. Web session lifetime without activity. Defaults to `1800`.
//! - `SESSION_SECURE_COOKIE` - Optional. Mark the session cookie `Secure`. Defaults to `true`.
//! - `HOST` - Optional. Web server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Web server port. Defaults to `8501`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::agent::PromptPolicy;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://wttr.in";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// A provider API key.
///
/// Only ever held in memory. `Debug` and `Display` never reveal the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank input.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Language-model settings shared by every agent build.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Chat-completion base URL (OpenAI wire format)
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional HTTP timeout for model calls
    pub timeout: Option<Duration>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 1.0,
            timeout: None,
        }
    }
}

/// Weather service settings.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Base URL, the lowercased city is appended as a path segment
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Web session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// A stored key is forgotten after this long without use
    pub idle_timeout: Duration,

    /// Send the session cookie with the `Secure` attribute
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            secure_cookie: true,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential from the environment, used by the CLI only
    pub api_key: Option<ApiKey>,

    /// Model settings
    pub model: ModelConfig,

    /// Weather settings
    pub weather: WeatherConfig,

    /// Which system instruction the agent runs with
    pub prompt_policy: PromptPolicy,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Web session settings
    pub session: SessionConfig,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: ModelConfig::default(),
            weather: WeatherConfig::default(),
            prompt_policy: PromptPolicy::default(),
            max_iterations: 25,
            session: SessionConfig::default(),
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a numeric or enum variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the common case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("OPENAI_API_KEY").and_then(ApiKey::new);

        let model = ModelConfig {
            base_url: lookup("OPENAI_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.model.base_url),
            model: lookup("COOKIN_MODEL").unwrap_or(defaults.model.model),
            temperature: parse_var(&lookup, "COOKIN_TEMPERATURE")?
                .unwrap_or(defaults.model.temperature),
            timeout: parse_var::<u64, _>(&lookup, "LLM_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        let weather = WeatherConfig {
            base_url: lookup("WEATHER_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.weather.base_url),
            timeout: parse_var::<u64, _>(&lookup, "WEATHER_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.weather.timeout),
        };

        let prompt_policy = parse_var(&lookup, "COOKIN_PROMPT_POLICY")?
            .unwrap_or(defaults.prompt_policy);

        let max_iterations = parse_var(&lookup, "COOKIN_MAX_ITERATIONS")?
            .unwrap_or(defaults.max_iterations);
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "COOKIN_MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let session = SessionConfig {
            idle_timeout: parse_var::<u64, _>(&lookup, "SESSION_IDLE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session.idle_timeout),
            secure_cookie: parse_var(&lookup, "SESSION_SECURE_COOKIE")?
                .unwrap_or(defaults.session.secure_cookie),
        };
        if session.idle_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "SESSION_IDLE_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);

        Ok(Self {
            api_key,
            model,
            weather,
            prompt_policy,
            max_iterations,
            session,
            host,
            port,
        })
    }

    /// The CLI credential, or an error naming the variable to set.
    pub fn require_api_key(&self) -> Result<ApiKey, ConfigError> {
        self.api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.temperature, 1.0);
        assert!(config.model.timeout.is_none());
        assert_eq!(config.weather.base_url, "https://wttr.in");
        assert_eq!(config.weather.timeout, Duration::from_secs(5));
        assert_eq!(config.prompt_policy, PromptPolicy::Graceful);
        assert_eq!(config.port, 8501);
        assert_eq!(config.session.idle_timeout, Duration::from_secs(1800));
        assert!(config.session.secure_cookie);
    }

    #[test]
    fn session_settings_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("SESSION_IDLE_SECS", "60"),
            ("SESSION_SECURE_COOKIE", "false"),
        ]))
        .unwrap();
        assert_eq!(config.session.idle_timeout, Duration::from_secs(60));
        assert!(!config.session.secure_cookie);

        let err = Config::from_lookup(lookup_from(&[("SESSION_IDLE_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "SESSION_IDLE_SECS"));
    }

    #[test]
    fn overrides_are_applied_and_trailing_slashes_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("COOKIN_PROMPT_POLICY", "strict"),
            ("WEATHER_TIMEOUT_SECS", "2"),
            ("LLM_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.require_api_key().unwrap().expose(), "sk-test");
        assert_eq!(config.model.base_url, "http://localhost:9000/v1");
        assert_eq!(config.prompt_policy, PromptPolicy::Strict);
        assert_eq!(config.weather.timeout, Duration::from_secs(2));
        assert_eq!(config.model.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "PORT"));
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let err =
            Config::from_lookup(lookup_from(&[("COOKIN_MAX_ITERATIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "   ")])).unwrap();
        let err = config.require_api_key().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: OPENAI_API_KEY"
        );
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }
}
