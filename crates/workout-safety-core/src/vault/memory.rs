//! In-memory [`Vault`] implementation for tests and embedding.
//!
//! Holds raw document text keyed by [`GeoKey`] and parses on every load, so
//! malformed fixtures behave exactly as they would on disk. Candidates come
//! back in insertion order.

use tracing::warn;

use crate::document::Document;
use crate::geo::GeoKey;

use super::Vault;

/// Fixture-backed vault.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVault {
    entries: Vec<(GeoKey, String)>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the raw text stored at `key`.
    ///
    /// Replacing keeps the original discovery position.
    pub fn insert(&mut self, key: GeoKey, raw: impl Into<String>) {
        let raw = raw.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = raw,
            None => self.entries.push((key, raw)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: GeoKey, raw: impl Into<String>) -> Self {
        self.insert(key, raw);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Vault for InMemoryVault {
    fn candidates(&self) -> Vec<GeoKey> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn load(&self, key: &GeoKey) -> Option<Document> {
        let (_, raw) = self.entries.iter().find(|(k, _)| k == key)?;
        match Document::parse(key.clone(), raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(key = %key, error = %e, "skipping malformed document");
                None
            }
        }
    }
}
