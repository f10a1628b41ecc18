//! Read-only content repository abstraction.
//!
//! The [`Vault`] trait is the only capability the enumerator and the
//! aggregation engine need: enumerate candidate addresses and load one
//! document. Implementations:
//!
//! - `FsVault` (in the `workout-safety` crate): `root/{country}/{state}/{city}.{ext}`
//! - [`memory::InMemoryVault`]: fixture-backed, for tests and embedding
//!
//! Vaults never mutate after construction, so implementations need no locks
//! and can be shared freely across concurrent requests.

pub mod memory;

use crate::document::Document;
use crate::geo::GeoKey;

/// Read-only, hierarchically addressed document store.
pub trait Vault: Send + Sync {
    /// Every leaf address present in the store, in discovery order.
    ///
    /// Candidates may include documents that fail to parse; the catalog
    /// filters them through [`load`](Vault::load). The order must be stable
    /// for an unmodified store.
    fn candidates(&self) -> Vec<GeoKey>;

    /// Loads and parses one document.
    ///
    /// Returns `None` when the document is absent *or* malformed; the two
    /// cases are indistinguishable to callers.
    fn load(&self, key: &GeoKey) -> Option<Document>;
}

impl<V: Vault + ?Sized> Vault for std::sync::Arc<V> {
    fn candidates(&self) -> Vec<GeoKey> {
        (**self).candidates()
    }

    fn load(&self, key: &GeoKey) -> Option<Document> {
        (**self).load(key)
    }
}
