//! Measurement types produced by the live-data overlays.
//!
//! Each overlay invocation ends in exactly one [`Outcome`]:
//!
//! | Variant | When | `source` in JSON |
//! |---------|------|------------------|
//! | [`Outcome::Delivered`] | provider answered successfully | `"live"` |
//! | [`Outcome::Synthesized`] | no credentials configured | `"synthetic"` |
//! | [`Outcome::Failed`] | provider errored; carries the sentinel reading | `"unavailable"` |
//!
//! Synthetic readings are pure functions of the [`Coordinate`]: no clock, no
//! randomness, so repeated calls produce byte-identical snapshots.

use serde::Serialize;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A metric an overlay can measure, synthesize, or report as unavailable.
pub trait Measurement: Clone + Serialize + Send + Sync + 'static {
    /// Short name used in logs (`"air_quality"`, `"weather"`).
    const KIND: &'static str;

    /// Deterministic placeholder reading for `coord`.
    fn synthesize(coord: Coordinate) -> Self;

    /// Sentinel reading returned when the provider fails.
    fn unavailable() -> Self;
}

/// Terminal state of one overlay invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source")]
pub enum Outcome<M> {
    #[serde(rename = "live")]
    Delivered(M),
    #[serde(rename = "synthetic")]
    Synthesized(M),
    #[serde(rename = "unavailable")]
    Failed(M),
}

impl<M> Outcome<M> {
    pub fn measurement(&self) -> &M {
        match self {
            Outcome::Delivered(m) | Outcome::Synthesized(m) | Outcome::Failed(m) => m,
        }
    }

    pub fn into_measurement(self) -> M {
        match self {
            Outcome::Delivered(m) | Outcome::Synthesized(m) | Outcome::Failed(m) => m,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Outcome::Delivered(_) => "live",
            Outcome::Synthesized(_) => "synthetic",
            Outcome::Failed(_) => "unavailable",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }
}

// ============ Air quality ============

/// Three-band air quality classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AqiBand {
    Good,
    Moderate,
    Poor,
}

impl AqiBand {
    /// `≤ 50` good, `≤ 100` moderate, otherwise poor.
    pub fn classify(aqi: u32) -> Self {
        if aqi <= 50 {
            AqiBand::Good
        } else if aqi <= 100 {
            AqiBand::Moderate
        } else {
            AqiBand::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiBand::Good => "good",
            AqiBand::Moderate => "moderate",
            AqiBand::Poor => "poor",
        }
    }

    /// Human category label used for synthetic readings.
    pub fn category_label(&self) -> &'static str {
        match self {
            AqiBand::Good => "Good",
            AqiBand::Moderate => "Moderate",
            AqiBand::Poor => "Unhealthy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQuality {
    pub aqi: u32,
    pub dominant_pollutant: String,
    pub category: String,
}

impl AirQuality {
    pub fn band(&self) -> AqiBand {
        AqiBand::classify(self.aqi)
    }
}

impl Measurement for AirQuality {
    const KIND: &'static str = "air_quality";

    /// `floor(|sin(lat·lon)·10000| mod 150) + 10`, always within `10..=159`.
    fn synthesize(coord: Coordinate) -> Self {
        let seed = ((coord.lat * coord.lon).sin() * 10_000.0).abs() % 150.0;
        let aqi = seed.floor() as u32 + 10;
        Self {
            aqi,
            dominant_pollutant: "PM2.5".to_string(),
            category: AqiBand::classify(aqi).category_label().to_string(),
        }
    }

    fn unavailable() -> Self {
        Self {
            aqi: 0,
            dominant_pollutant: "N/A".to_string(),
            category: "Data unavailable".to_string(),
        }
    }
}

// ============ Weather ============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    /// Degrees Celsius.
    pub temperature: f64,
    pub conditions: String,
    /// Kilometres per hour.
    pub wind_speed: f64,
    pub wind_direction: String,
}

impl Weather {
    /// Temperature in Fahrenheit, rounded to the nearest degree.
    pub fn temperature_f(&self) -> i64 {
        (self.temperature * 9.0 / 5.0 + 32.0).round() as i64
    }
}

impl Measurement for Weather {
    const KIND: &'static str = "weather";

    /// With `seed = |lat·lon|`: 10–40 °C and 5–25 km/h.
    fn synthesize(coord: Coordinate) -> Self {
        let seed = (coord.lat * coord.lon).abs();
        Self {
            temperature: (seed % 30.0 + 10.0).round(),
            conditions: "Partly Cloudy".to_string(),
            wind_speed: (seed % 20.0 + 5.0).round(),
            wind_direction: "NW".to_string(),
        }
    }

    fn unavailable() -> Self {
        Self {
            temperature: 0.0,
            conditions: "Unknown".to_string(),
            wind_speed: 0.0,
            wind_direction: "N/A".to_string(),
        }
    }
}

// ============ Label normalization ============

const WIND_PREFIX: &str = "WIND_DIRECTION_";

/// Maps a provider wind-direction code to a compass abbreviation.
///
/// Unknown codes pass through with the `WIND_DIRECTION_` prefix stripped.
pub fn wind_direction_label(code: &str) -> String {
    let label = match code {
        "WIND_DIRECTION_NORTH" => "N",
        "WIND_DIRECTION_NORTHEAST" => "NE",
        "WIND_DIRECTION_EAST" => "E",
        "WIND_DIRECTION_SOUTHEAST" => "SE",
        "WIND_DIRECTION_SOUTH" => "S",
        "WIND_DIRECTION_SOUTHWEST" => "SW",
        "WIND_DIRECTION_WEST" => "W",
        "WIND_DIRECTION_NORTHWEST" => "NW",
        other => return other.strip_prefix(WIND_PREFIX).unwrap_or(other).to_string(),
    };
    label.to_string()
}

/// Turns a condition identifier into Title Case words.
///
/// Accepts icon URIs (`".../v1/mostly_sunny"`) and bare identifiers
/// (`"MOSTLY_CLOUDY"`); only the last `/` segment is used.
pub fn conditions_label(identifier: &str) -> String {
    let last = identifier.rsplit('/').next().unwrap_or_default();
    last.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
