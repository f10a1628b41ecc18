//! Geographic addressing for vault documents.
//!
//! A [`GeoKey`] is the `(country, state, city)` triple that addresses exactly
//! one document. Every component is validated as a lowercase hyphenated slug
//! at construction, so a key can never carry a path separator or `..` into a
//! store implementation.

use std::fmt;

use serde::Serialize;

use crate::error::VaultError;

/// Checks that `component` is a non-empty slug made of `[a-z0-9-]`.
pub fn validate_slug(component: &str) -> Result<(), VaultError> {
    let invalid = |reason| {
        Err(VaultError::InvalidKey {
            component: component.to_string(),
            reason,
        })
    };

    if component.is_empty() {
        return invalid("empty component");
    }
    if component.contains(['/', '\\']) {
        return invalid("contains a path separator");
    }
    if !component
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return invalid("expected lowercase letters, digits, and hyphens");
    }
    Ok(())
}

/// Returns true if `component` would pass [`validate_slug`].
pub fn is_slug(component: &str) -> bool {
    validate_slug(component).is_ok()
}

/// Title-cases a hyphenated slug for display: `"new-south-wales"` → `"New South Wales"`.
pub fn display_name(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Address of a single vault document.
///
/// Field order matters: the derived `Ord` sorts by country, then state, then
/// city.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GeoKey {
    country: String,
    state: String,
    city: String,
}

impl GeoKey {
    pub fn new(
        country: impl Into<String>,
        state: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self, VaultError> {
        let (country, state, city) = (country.into(), state.into(), city.into());
        validate_slug(&country)?;
        validate_slug(&state)?;
        validate_slug(&city)?;
        Ok(Self {
            country,
            state,
            city,
        })
    }

    /// Parses `"country/state/city"`.
    pub fn parse(path: &str) -> Result<Self, VaultError> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        match parts.as_slice() {
            [country, state, city] => Self::new(*country, *state, *city),
            _ => Err(VaultError::InvalidKey {
                component: path.to_string(),
                reason: "expected country/state/city",
            }),
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Returns true if this key falls under the given country.
    pub fn in_country(&self, country: &str) -> bool {
        self.country == country
    }

    /// Returns true if this key falls under the given country and state.
    pub fn in_state(&self, country: &str, state: &str) -> bool {
        self.country == country && self.state == state
    }
}

impl fmt::Display for GeoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country, self.state, self.city)
    }
}

/// A full or partial geo key, used to name what a query covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Scope {
    Country { country: String },
    State { country: String, state: String },
    City { key: GeoKey },
}

impl Scope {
    pub fn country(country: &str) -> Self {
        Scope::Country {
            country: country.to_string(),
        }
    }

    pub fn state(country: &str, state: &str) -> Self {
        Scope::State {
            country: country.to_string(),
            state: state.to_string(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Country { country } => write!(f, "{}", country),
            Scope::State { country, state } => write!(f, "{}/{}", country, state),
            Scope::City { key } => write!(f, "{}", key),
        }
    }
}
