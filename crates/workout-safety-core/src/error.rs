//! Error taxonomy for vault queries.
//!
//! Only [`VaultError::NotFound`] is expected to reach callers in normal
//! operation; malformed documents collapse into it at the store boundary.

use thiserror::Error;

use crate::geo::Scope;

/// Errors surfaced by vault lookups and aggregation queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// The scope has no valid documents beneath it.
    #[error("not found: {0}")]
    NotFound(Scope),

    /// A key component is not a lowercase hyphenated slug.
    #[error("invalid slug {component:?}: {reason}")]
    InvalidKey {
        component: String,
        reason: &'static str,
    },
}

impl VaultError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::NotFound(_))
    }
}
