//! Vault documents: YAML frontmatter plus an opaque body.
//!
//! A document file looks like:
//!
//! ```text
//! ---
//! title: "Austin, Texas Workout Safety Guide"
//! city: "Austin"
//! lat: 30.2672
//! ...
//! ---
//!
//! Body text, passed through untouched.
//! ```
//!
//! [`Document::parse`] is all-or-nothing: a missing fence, a YAML error, a
//! missing required field, or an out-of-range value yields a
//! [`DocumentError`] and no partial record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoKey;

const FENCE: &str = "---";

/// Why a document failed to parse. Stores treat every variant as "not found".
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("missing opening `---` frontmatter fence")]
    MissingFrontmatter,

    #[error("unterminated frontmatter block")]
    UnterminatedFrontmatter,

    #[error("frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// Categorical pollen level recorded at authoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollenLevel {
    Low,
    Moderate,
    #[serde(alias = "Very High")]
    High,
}

impl PollenLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollenLevel::Low => "Low",
            PollenLevel::Moderate => "Moderate",
            PollenLevel::High => "High",
        }
    }
}

/// Typed frontmatter schema. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    pub title: String,
    pub description: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub lungs_joints_score: f64,
    pub pollen_level: PollenLevel,
    pub aqi: u32,
    pub last_updated: DateTime<Utc>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_tail_keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_pollutant: Option<String>,
}

impl Frontmatter {
    fn validate(&self) -> Result<(), DocumentError> {
        let invalid = |field, reason: &str| {
            Err(DocumentError::InvalidField {
                field,
                reason: reason.to_string(),
            })
        };

        if self.title.trim().is_empty() {
            return invalid("title", "must not be empty");
        }
        if self.city.trim().is_empty() {
            return invalid("city", "must not be empty");
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return invalid("lat", "must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return invalid("lon", "must be within [-180, 180]");
        }
        if !(0.0..=10.0).contains(&self.lungs_joints_score) {
            return invalid("lungsJointsScore", "must be within [0, 10]");
        }
        Ok(())
    }
}

/// A fully parsed vault document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub key: GeoKey,
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Document {
    /// Parses raw file contents into a document addressed by `key`.
    pub fn parse(key: GeoKey, raw: &str) -> Result<Self, DocumentError> {
        let (yaml, body) = split_frontmatter(raw)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;
        frontmatter.validate()?;
        Ok(Self {
            key,
            frontmatter,
            body: body.to_string(),
        })
    }
}

/// Splits `raw` into the YAML between the `---` fences and the body after.
pub fn split_frontmatter(raw: &str) -> Result<(&str, &str), DocumentError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = match raw.strip_prefix(FENCE) {
        Some(rest) if rest.starts_with('\n') || rest.starts_with("\r\n") => rest,
        _ => return Err(DocumentError::MissingFrontmatter),
    };
    let rest = rest.trim_start_matches('\r').trim_start_matches('\n');

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((yaml, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    Err(DocumentError::UnterminatedFrontmatter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUSTIN: &str = r#"---
title: "Austin, Texas Workout Safety Guide — Pollen & Air Quality"
description: "Should you work out outside in Austin today?"
city: "Austin"
state: "Texas"
country: "us"
lat: 30.2672
lon: -97.7431
lungsJointsScore: 7
pollenLevel: "Moderate"
aqi: 42
dominantPollutant: "pm25"
lastUpdated: "2025-03-01T12:00:00Z"
tags:
  - "outdoor workout"
  - "austin"
canonicalUrl: "https://healthislife.work/workout-safety/us/texas/austin"
---

## Today on Lady Bird Lake

<BulletList>
- Cedar is done.
</BulletList>
"#;

    fn key() -> GeoKey {
        GeoKey::parse("us/texas/austin").unwrap()
    }

    #[test]
    fn test_parse_full_document() {
        let doc = Document::parse(key(), AUSTIN).unwrap();
        let fm = &doc.frontmatter;
        assert_eq!(fm.city, "Austin");
        assert_eq!(fm.lungs_joints_score, 7.0);
        assert_eq!(fm.pollen_level, PollenLevel::Moderate);
        assert_eq!(fm.aqi, 42);
        assert_eq!(fm.tags.len(), 2);
        assert_eq!(fm.dominant_pollutant.as_deref(), Some("pm25"));
        assert!(fm.temperature.is_none());
        assert!(doc.body.starts_with("## Today on Lady Bird Lake"));
        assert!(doc.body.contains("</BulletList>"));
    }

    #[test]
    fn test_parse_rejects_missing_fence() {
        let err = Document::parse(key(), "title: nope\n").unwrap_err();
        assert!(matches!(err, DocumentError::MissingFrontmatter));
    }

    #[test]
    fn test_parse_rejects_unterminated() {
        let err = Document::parse(key(), "---\ntitle: x\n").unwrap_err();
        assert!(matches!(err, DocumentError::UnterminatedFrontmatter));
    }

    #[test]
    fn test_parse_rejects_missing_required_field() {
        let raw = AUSTIN.replace("aqi: 42\n", "");
        let err = Document::parse(key(), &raw).unwrap_err();
        assert!(matches!(err, DocumentError::Yaml(_)));
    }

    #[test]
    fn test_parse_rejects_ill_typed_field() {
        let raw = AUSTIN.replace("lat: 30.2672", "lat: \"north\"");
        assert!(Document::parse(key(), &raw).is_err());
    }

    #[test]
    fn test_parse_rejects_score_out_of_range() {
        let raw = AUSTIN.replace("lungsJointsScore: 7", "lungsJointsScore: 11");
        let err = Document::parse(key(), &raw).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidField {
                field: "lungsJointsScore",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_pollen_level() {
        let raw = AUSTIN.replace("\"Moderate\"", "\"Extreme\"");
        assert!(Document::parse(key(), &raw).is_err());
    }

    #[test]
    fn test_very_high_pollen_maps_to_high() {
        let raw = AUSTIN.replace("\"Moderate\"", "\"Very High\"");
        let doc = Document::parse(key(), &raw).unwrap();
        assert_eq!(doc.frontmatter.pollen_level, PollenLevel::High);
    }

    #[test]
    fn test_split_handles_crlf() {
        let raw = "---\r\ntitle: x\r\n---\r\nbody\r\n";
        let (yaml, body) = split_frontmatter(raw).unwrap();
        assert_eq!(yaml.trim_end(), "title: x");
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn test_frontmatter_serializes_camel_case() {
        let doc = Document::parse(key(), AUSTIN).unwrap();
        let json = serde_json::to_value(&doc.frontmatter).unwrap();
        assert_eq!(json["lungsJointsScore"], 7.0);
        assert_eq!(json["pollenLevel"], "Moderate");
        assert!(json.get("temperature").is_none());
    }
}
