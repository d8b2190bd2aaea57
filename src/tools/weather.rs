//! Current-weather lookup against wttr.in, exposed to the model as `get_weather`.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use super::Tool;
use crate::config::WeatherConfig;

/// Returned in place of conditions whenever the lookup fails for any reason.
pub const WEATHER_UNAVAILABLE: &str = "The weather API is not available";

/// Why a lookup failed. Collapsed to [`WeatherResult::Unavailable`] before leaving this module.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("weather service answered HTTP {0}")]
    Status(u16),

    #[error("weather payload is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("weather payload has no current_condition")]
    MissingField,
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherResult {
    /// The provider's `current_condition` value, untouched.
    Conditions(Value),
    Unavailable,
}

impl WeatherResult {
    pub fn is_available(&self) -> bool {
        matches!(self, WeatherResult::Conditions(_))
    }

    /// Text handed back to the model.
    pub fn to_tool_output(&self) -> String {
        match self {
            WeatherResult::Conditions(value) => value.to_string(),
            WeatherResult::Unavailable => WEATHER_UNAVAILABLE.to_string(),
        }
    }
}

/// HTTP client for the weather service.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request URL for a city. The city is lowercased and otherwise passed through.
    pub fn url_for(&self, city: &str) -> String {
        format!("{}/{}?format=j1&lang=en", self.base_url, city.to_lowercase())
    }

    /// Look up current conditions, never failing.
    pub async fn lookup(&self, city: &str) -> WeatherResult {
        match self.fetch(city).await {
            Ok(conditions) => WeatherResult::Conditions(conditions),
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "Weather lookup failed");
                WeatherResult::Unavailable
            }
        }
    }

    /// Look up current conditions, keeping the failure kind.
    pub async fn fetch(&self, city: &str) -> Result<Value, WeatherError> {
        let url = self.url_for(city);
        tracing::debug!(url = %url, "Fetching weather");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let mut body: Value = response.json().await.map_err(WeatherError::Decode)?;
        match body.get_mut("current_condition").map(Value::take) {
            Some(Value::Null) | None => Err(WeatherError::MissingField),
            Some(conditions) => Ok(conditions),
        }
    }
}

/// The `get_weather` tool.
pub struct GetWeather {
    client: WeatherClient,
}

impl GetWeather {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Returns the current weather conditions for a given city using the wttr.in API. \
         Returns the string 'The weather API is not available' if the weather cannot be retrieved."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city for which to get the weather"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let city = args["city"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'city' argument"))?;

        Ok(self.client.lookup(city).await.to_tool_output())
    }
}
