//! Google Weather provider.
//!
//! `GET {base}/v1/currentConditions:lookup?location.latitude=…&location.longitude=…&key=…`.
//! Temperatures are Celsius. The condition identifier comes from `icon`, or
//! the condition's icon URI, or its type code, and is normalized to Title
//! Case words; wind-direction codes map to compass abbreviations.

use async_trait::async_trait;
use serde::Deserialize;
use workout_safety_core::live::{conditions_label, wind_direction_label, Coordinate, Weather};

use super::{send_fresh, Provider, ProviderCredentials, ProviderError};

pub struct GoogleWeather {
    base_url: String,
}

impl GoogleWeather {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/currentConditions:lookup", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentConditions {
    temperature: Option<Degrees>,
    icon: Option<String>,
    weather_condition: Option<WeatherCondition>,
    wind_speed: Option<WindSpeed>,
}

#[derive(Debug, Deserialize)]
struct Degrees {
    degrees: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherCondition {
    icon_base_uri: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindSpeed {
    speed: Option<f64>,
    direction: Option<String>,
}

impl CurrentConditions {
    /// Missing condition or wind direction reads as "Unknown" and "N/A",
    /// the same labels as the unavailable reading, never an empty string.
    fn into_measurement(self) -> Weather {
        let condition = self.weather_condition.as_ref();
        let identifier = self
            .icon
            .clone()
            .or_else(|| condition.and_then(|c| c.icon_base_uri.clone()))
            .or_else(|| condition.and_then(|c| c.kind.clone()))
            .unwrap_or_default();
        let conditions = match conditions_label(&identifier) {
            label if label.is_empty() => "Unknown".to_string(),
            label => label,
        };

        let wind = self.wind_speed.as_ref();
        let wind_direction = wind
            .and_then(|w| w.direction.as_deref())
            .map(wind_direction_label)
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| "N/A".to_string());

        Weather {
            temperature: self
                .temperature
                .and_then(|t| t.degrees)
                .unwrap_or(0.0),
            conditions,
            wind_speed: wind.and_then(|w| w.speed).unwrap_or(0.0),
            wind_direction,
        }
    }
}

#[async_trait]
impl Provider for GoogleWeather {
    type Output = Weather;

    fn name(&self) -> &str {
        "google-weather"
    }

    async fn request(
        &self,
        client: &reqwest::Client,
        credentials: &ProviderCredentials,
        coord: Coordinate,
    ) -> Result<Weather, ProviderError> {
        let request = client.get(self.endpoint()).query(&[
            ("location.latitude", coord.lat.to_string()),
            ("location.longitude", coord.lon.to_string()),
            ("key", credentials.api_key().to_string()),
        ]);

        let response = send_fresh(request).await?;
        let parsed: CurrentConditions = response.json().await.map_err(ProviderError::decode)?;
        Ok(parsed.into_measurement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Weather {
        serde_json::from_value::<CurrentConditions>(json)
            .unwrap()
            .into_measurement()
    }

    #[test]
    fn test_full_response() {
        let w = parse(serde_json::json!({
            "temperature": { "degrees": 23.4, "unit": "CELSIUS" },
            "icon": "https://maps.gstatic.com/weather/v1/mostly_sunny",
            "windSpeed": { "speed": 14.0, "direction": "WIND_DIRECTION_SOUTHWEST" }
        }));
        assert_eq!(w.temperature, 23.4);
        assert_eq!(w.conditions, "Mostly Sunny");
        assert_eq!(w.wind_speed, 14.0);
        assert_eq!(w.wind_direction, "SW");
    }

    #[test]
    fn test_condition_type_fallback() {
        let w = parse(serde_json::json!({
            "weatherCondition": { "type": "LIGHT_RAIN" },
            "windSpeed": { "direction": "WIND_DIRECTION_FOO" }
        }));
        assert_eq!(w.conditions, "Light Rain");
        assert_eq!(w.wind_direction, "FOO");
        assert_eq!(w.temperature, 0.0);
    }

    #[test]
    fn test_empty_response_defaults() {
        let w = parse(serde_json::json!({}));
        assert_eq!(w.conditions, "Unknown");
        assert_eq!(w.wind_direction, "N/A");
        assert_eq!(w.wind_speed, 0.0);
    }
}
