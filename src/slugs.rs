//! `wsafe slugs`: list enumerated keys at one level.

use anyhow::Result;
use clap::ValueEnum;
use workout_safety_core::catalog::{all_keys, country_states, countries};
use workout_safety_core::vault::Vault;

use crate::config::Config;
use crate::fs_vault::FsVault;

/// Granularity of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlugLevel {
    Country,
    State,
    City,
}

/// Lines to print for `level`, one path per entry.
///
/// Countries are sorted; states and cities keep discovery order.
pub fn list_slugs(vault: &dyn Vault, level: SlugLevel) -> Vec<String> {
    match level {
        SlugLevel::Country => countries(vault).into_iter().collect(),
        SlugLevel::State => country_states(vault)
            .into_iter()
            .map(|(country, state)| format!("{}/{}", country, state))
            .collect(),
        SlugLevel::City => all_keys(vault).iter().map(|k| k.to_string()).collect(),
    }
}

pub fn run_slugs(config: &Config, level: SlugLevel) -> Result<()> {
    let vault = FsVault::from_config(&config.vault);
    for line in list_slugs(&vault, level) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use workout_safety_core::geo::GeoKey;
    use workout_safety_core::vault::memory::InMemoryVault;

    fn doc() -> &'static str {
        "---\ntitle: \"t\"\ndescription: \"d\"\ncity: \"c\"\nstate: \"s\"\ncountry: \"c\"\nlat: 1.0\nlon: 2.0\nlungsJointsScore: 5\npollenLevel: \"Low\"\naqi: 30\nlastUpdated: \"2025-01-01T00:00:00Z\"\ntags: []\n---\n"
    }

    #[test]
    fn test_levels() {
        let key = |p: &str| GeoKey::parse(p).unwrap();
        let vault = InMemoryVault::new()
            .with(key("us/texas/austin"), doc())
            .with(key("au/victoria/melbourne"), doc())
            .with(key("us/texas/dallas"), doc());

        assert_eq!(list_slugs(&vault, SlugLevel::Country), vec!["au", "us"]);
        assert_eq!(
            list_slugs(&vault, SlugLevel::State),
            vec!["us/texas", "au/victoria"]
        );
        assert_eq!(
            list_slugs(&vault, SlugLevel::City),
            vec!["us/texas/austin", "au/victoria/melbourne", "us/texas/dallas"]
        );
    }
}
