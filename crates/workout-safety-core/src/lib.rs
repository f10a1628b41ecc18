//! # Workout Safety Core
//!
//! Runtime-free logic for the workout safety vault: geo keys, the document
//! model and frontmatter parsing, the [`vault::Vault`] abstraction, slug
//! enumeration, aggregate rollups, and the measurement types produced by the
//! live-data overlays.
//!
//! This crate contains no tokio, HTTP, or filesystem I/O. The filesystem
//! vault and the network providers live in the `workout-safety` crate.

pub mod aggregate;
pub mod catalog;
pub mod document;
pub mod error;
pub mod geo;
pub mod live;
pub mod vault;
