//! Live-data overlays: fetch-or-synthesize measurements per coordinate.
//!
//! Defines the [`Provider`] trait and the generic [`Overlay`] that drives it:
//! - **[`air_quality::GoogleAirQuality`]**: Google Air Quality `currentConditions:lookup`
//! - **[`weather::GoogleWeather`]**: Google Weather `currentConditions:lookup`
//!
//! # State machine
//!
//! Every [`Overlay::fetch`] starts from scratch and ends in one terminal
//! [`Outcome`]:
//!
//! ```text
//! NotRequested ──▶ Fetching ──┬──▶ Delivered    (provider 2xx, body decoded)
//!                             ├──▶ Synthesized  (no credentials, no network)
//!                             └──▶ Failed       (status / transport / decode error)
//! ```
//!
//! There are no retries and nothing is cached: each call issues at most one
//! request, sent with `Cache-Control: no-cache, no-store`. Failures are
//! logged and converted to the measurement's sentinel reading, so `fetch`
//! has no error path.

pub mod air_quality;
pub mod weather;

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use workout_safety_core::geo::GeoKey;
use workout_safety_core::live::{AirQuality, Coordinate, Measurement, Outcome, Weather};
use workout_safety_core::vault::Vault;

use crate::config::{Config, OverlayConfig};
use crate::fs_vault::FsVault;

use self::air_quality::GoogleAirQuality;
use self::weather::GoogleWeather;

/// API key for the measurement providers.
#[derive(Clone)]
pub struct ProviderCredentials {
    api_key: String,
}

impl ProviderCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Why a provider request did not yield a measurement.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("undecodable response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ProviderError {
    // The request URL carries the API key; drop it before the error can be
    // displayed or logged.
    pub(crate) fn transport(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.without_url())
    }

    pub(crate) fn decode(e: reqwest::Error) -> Self {
        ProviderError::Decode(e.without_url())
    }
}

/// An external measurement service.
///
/// Implementations issue exactly one request per call and map the response
/// into their [`Measurement`] type. They never synthesize; [`Overlay`] owns
/// that decision.
#[async_trait]
pub trait Provider: Send + Sync {
    type Output: Measurement;

    /// Provider identifier used in logs.
    fn name(&self) -> &str;

    async fn request(
        &self,
        client: &reqwest::Client,
        credentials: &ProviderCredentials,
        coord: Coordinate,
    ) -> Result<Self::Output, ProviderError>;
}

/// Sends `request` with caching disabled and rejects non-success statuses.
pub(crate) async fn send_fresh(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ProviderError> {
    let response = request
        .header(CACHE_CONTROL, "no-cache, no-store")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .map_err(ProviderError::transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status { status, body });
    }
    Ok(response)
}

/// One overlay kind bound to its provider and optional credentials.
pub struct Overlay<P> {
    provider: P,
    credentials: Option<ProviderCredentials>,
    client: reqwest::Client,
}

impl<P: Provider> Overlay<P> {
    pub fn new(
        provider: P,
        credentials: Option<ProviderCredentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            provider,
            credentials,
            client,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Runs one invocation to a terminal [`Outcome`]. Never fails.
    pub async fn fetch(&self, coord: Coordinate) -> Outcome<P::Output> {
        let kind = <P::Output as Measurement>::KIND;

        let Some(credentials) = &self.credentials else {
            debug!(kind, "no provider credentials, synthesizing reading");
            return Outcome::Synthesized(P::Output::synthesize(coord));
        };

        match self.provider.request(&self.client, credentials, coord).await {
            Ok(measurement) => Outcome::Delivered(measurement),
            Err(e) => {
                warn!(
                    kind,
                    provider = self.provider.name(),
                    error = %e,
                    "provider unavailable, returning sentinel reading"
                );
                Outcome::Failed(P::Output::unavailable())
            }
        }
    }
}

/// Both measurements for one coordinate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveReport {
    pub coordinate: Coordinate,
    pub air_quality: Outcome<AirQuality>,
    pub weather: Outcome<Weather>,
}

/// The air quality and weather overlays, sharing one credential value.
pub struct LiveOverlays {
    pub air_quality: Overlay<GoogleAirQuality>,
    pub weather: Overlay<GoogleWeather>,
}

impl LiveOverlays {
    pub fn from_config(
        config: &OverlayConfig,
        credentials: Option<ProviderCredentials>,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            air_quality: Overlay::new(
                GoogleAirQuality::new(&config.air_quality_url),
                credentials.clone(),
                timeout,
            )?,
            weather: Overlay::new(GoogleWeather::new(&config.weather_url), credentials, timeout)?,
        })
    }

    /// Fetches both overlays concurrently; neither waits on the other.
    pub async fn fetch(&self, coord: Coordinate) -> LiveReport {
        let (air_quality, weather) =
            tokio::join!(self.air_quality.fetch(coord), self.weather.fetch(coord));
        LiveReport {
            coordinate: coord,
            air_quality,
            weather,
        }
    }
}

/// What `wsafe live` should look up.
#[derive(Debug, Clone)]
pub enum LiveTarget {
    Key(String),
    Coordinate(Coordinate),
}

/// CLI entry point: resolves the coordinate, fetches both overlays, prints JSON.
pub async fn run_live(config: &Config, target: LiveTarget) -> Result<()> {
    let coord = match target {
        LiveTarget::Coordinate(coord) => coord,
        LiveTarget::Key(path) => {
            let key = GeoKey::parse(&path)?;
            let vault = FsVault::from_config(&config.vault);
            let doc = vault
                .load(&key)
                .ok_or_else(|| anyhow::anyhow!("document not found: {}", key))?;
            Coordinate::new(doc.frontmatter.lat, doc.frontmatter.lon)
        }
    };

    let overlays = LiveOverlays::from_config(&config.overlay, config.resolve_credentials())?;
    let report = overlays.fetch(coord).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
