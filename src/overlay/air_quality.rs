//! Google Air Quality provider.
//!
//! `POST {base}/v1/currentConditions:lookup?key=…` with a JSON body naming
//! the location. The response lists one or more indexes; the universal index
//! (`uaqi`) is preferred, otherwise the first one. The dominant pollutant is
//! reported as a code and resolved against the `pollutants` table when it is
//! present.

use async_trait::async_trait;
use serde::Deserialize;
use workout_safety_core::live::{AirQuality, Coordinate};

use super::{send_fresh, Provider, ProviderCredentials, ProviderError};

const PRIMARY_INDEX: &str = "uaqi";

pub struct GoogleAirQuality {
    base_url: String,
}

impl GoogleAirQuality {
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
struct LookupResponse {
    #[serde(default)]
    indexes: Vec<AqiIndex>,
    #[serde(default)]
    pollutants: Vec<Pollutant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AqiIndex {
    code: Option<String>,
    aqi: Option<u32>,
    category: Option<String>,
    dominant_pollutant: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pollutant {
    code: Option<String>,
    full_name: Option<String>,
}

impl LookupResponse {
    fn into_measurement(self) -> AirQuality {
        let index = self
            .indexes
            .iter()
            .find(|i| i.code.as_deref() == Some(PRIMARY_INDEX))
            .or_else(|| self.indexes.first());

        let pollutant_code = index.and_then(|i| i.dominant_pollutant.clone());
        let dominant_pollutant = pollutant_code
            .as_deref()
            .and_then(|code| {
                self.pollutants
                    .iter()
                    .find(|p| p.code.as_deref() == Some(code))
                    .and_then(|p| p.full_name.clone())
            })
            .or(pollutant_code)
            .unwrap_or_else(|| "Unknown".to_string());

        AirQuality {
            aqi: index.and_then(|i| i.aqi).unwrap_or(0),
            dominant_pollutant,
            category: index
                .and_then(|i| i.category.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

#[async_trait]
impl Provider for GoogleAirQuality {
    type Output = AirQuality;

    fn name(&self) -> &str {
        "google-air-quality"
    }

    async fn request(
        &self,
        client: &reqwest::Client,
        credentials: &ProviderCredentials,
        coord: Coordinate,
    ) -> Result<AirQuality, ProviderError> {
        let body = serde_json::json!({
            "location": { "latitude": coord.lat, "longitude": coord.lon },
            "extraComputations": ["HEALTH_RECOMMENDATIONS", "DOMINANT_POLLUTANT_CONCENTRATION"],
        });

        let request = client
            .post(self.endpoint())
            .query(&[("key", credentials.api_key())])
            .json(&body);

        let response = send_fresh(request).await?;
        let parsed: LookupResponse = response.json().await.map_err(ProviderError::decode)?;
        Ok(parsed.into_measurement())
    }
}
