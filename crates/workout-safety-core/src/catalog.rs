//! Slug enumeration over a [`Vault`].
//!
//! These functions drive static page generation and sitemap emission, so
//! their output must be complete (every loadable document), duplicate-free,
//! and stable for an unmodified vault.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::document::Document;
use crate::geo::GeoKey;
use crate::vault::Vault;

/// Every loadable document with its key, in discovery order.
///
/// Each distinct candidate is loaded exactly once; those that fail to load
/// (malformed frontmatter) are dropped.
pub fn loaded_entries(vault: &dyn Vault) -> Vec<(GeoKey, Document)> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for key in vault.candidates() {
        if !seen.insert(key.clone()) {
            continue;
        }
        match vault.load(&key) {
            Some(doc) => entries.push((key, doc)),
            None => debug!(key = %key, "candidate not loadable, omitted from catalog"),
        }
    }
    entries
}

/// Every loadable key in the vault, in discovery order.
pub fn all_keys(vault: &dyn Vault) -> Vec<GeoKey> {
    loaded_entries(vault).into_iter().map(|(key, _)| key).collect()
}

/// Distinct countries with at least one loadable document.
pub fn countries(vault: &dyn Vault) -> BTreeSet<String> {
    all_keys(vault)
        .into_iter()
        .map(|k| k.country().to_string())
        .collect()
}

/// Distinct states beneath `country`. Unknown countries yield an empty set.
pub fn states_of(vault: &dyn Vault, country: &str) -> BTreeSet<String> {
    all_keys(vault)
        .into_iter()
        .filter(|k| k.in_country(country))
        .map(|k| k.state().to_string())
        .collect()
}

/// Distinct `(country, state)` pairs, in first-discovery order.
pub fn country_states(vault: &dyn Vault) -> Vec<(String, String)> {
    distinct_pairs(&all_keys(vault))
}

/// Distinct `(country, state)` pairs of `keys`, keeping first occurrence.
pub fn distinct_pairs(keys: &[GeoKey]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    keys.iter()
        .filter_map(|k| {
            let pair = (k.country().to_string(), k.state().to_string());
            seen.insert(pair.clone()).then_some(pair)
        })
        .collect()
}
