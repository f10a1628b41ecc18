//! Aggregation over partial geo keys.
//!
//! Loads every document under a country or a (country, state) pair and
//! computes rollups. Rollups are derived on each call and never stored.
//!
//! An empty scope is reported as [`VaultError::NotFound`]; [`rollup`] itself
//! returns `None` for zero entries, so a NaN average cannot be produced.

use serde::Serialize;

use crate::catalog::loaded_entries;
use crate::document::Document;
use crate::error::VaultError;
use crate::geo::Scope;
use crate::vault::Vault;

/// Documents of one state, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct StateGroup {
    pub state: String,
    pub entries: Vec<Document>,
}

/// Count and unrounded means over a non-empty set of documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupStats {
    pub document_count: usize,
    pub average_score: f64,
    pub average_aqi: f64,
}

/// A rollup together with the scope and the documents it covers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRollup {
    pub scope: Scope,
    #[serde(flatten)]
    pub stats: RollupStats,
    /// Serialized as `entries`; one group per state.
    #[serde(rename = "entries")]
    pub groups: Vec<StateGroup>,
}

impl AggregateRollup {
    /// All documents across groups, in discovery order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }
}

/// Loads every document under `country`, grouped by state.
///
/// Groups appear in the order their first document was discovered; entries
/// within a group keep discovery order.
pub fn entries_by_country(vault: &dyn Vault, country: &str) -> Result<Vec<StateGroup>, VaultError> {
    let mut groups: Vec<StateGroup> = Vec::new();
    for (key, doc) in loaded_entries(vault)
        .into_iter()
        .filter(|(k, _)| k.in_country(country))
    {
        match groups.iter_mut().find(|g| g.state == key.state()) {
            Some(group) => group.entries.push(doc),
            None => groups.push(StateGroup {
                state: key.state().to_string(),
                entries: vec![doc],
            }),
        }
    }

    if groups.is_empty() {
        return Err(VaultError::NotFound(Scope::country(country)));
    }
    Ok(groups)
}

/// Loads every document under `country/state`, in discovery order.
pub fn entries_by_state(
    vault: &dyn Vault,
    country: &str,
    state: &str,
) -> Result<Vec<Document>, VaultError> {
    let entries: Vec<Document> = loaded_entries(vault)
        .into_iter()
        .filter(|(k, _)| k.in_state(country, state))
        .map(|(_, doc)| doc)
        .collect();

    if entries.is_empty() {
        return Err(VaultError::NotFound(Scope::state(country, state)));
    }
    Ok(entries)
}

/// Arithmetic means of score and AQI. `None` when `entries` is empty.
pub fn rollup<'a, I>(entries: I) -> Option<RollupStats>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut count = 0usize;
    let mut score_sum = 0.0;
    let mut aqi_sum = 0.0;
    for doc in entries {
        count += 1;
        score_sum += doc.frontmatter.lungs_joints_score;
        aqi_sum += f64::from(doc.frontmatter.aqi);
    }

    if count == 0 {
        return None;
    }
    Some(RollupStats {
        document_count: count,
        average_score: score_sum / count as f64,
        average_aqi: aqi_sum / count as f64,
    })
}

/// Country-wide rollup, grouped by state.
pub fn country_rollup(vault: &dyn Vault, country: &str) -> Result<AggregateRollup, VaultError> {
    let scope = Scope::country(country);
    let groups = entries_by_country(vault, country)?;
    let stats = rollup(groups.iter().flat_map(|g| g.entries.iter()))
        .ok_or_else(|| VaultError::NotFound(scope.clone()))?;
    Ok(AggregateRollup {
        scope,
        stats,
        groups,
    })
}

/// State-wide rollup; `groups` holds a single group.
pub fn state_rollup(
    vault: &dyn Vault,
    country: &str,
    state: &str,
) -> Result<AggregateRollup, VaultError> {
    let scope = Scope::state(country, state);
    let entries = entries_by_state(vault, country, state)?;
    let stats = rollup(&entries).ok_or_else(|| VaultError::NotFound(scope.clone()))?;
    Ok(AggregateRollup {
        scope,
        stats,
        groups: vec![StateGroup {
            state: state.to_string(),
            entries,
        }],
    })
}
