//! # Workout Safety
//!
//! Serves city-level outdoor workout safety guides from a vault of
//! frontmatter documents, with live air quality and weather overlaid per
//! request.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ vault/*.mdx  │──▶│   FsVault    │──▶│ catalog /    │
//! │ c/s/city     │   │ parse + skip │   │ aggregate    │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!        ┌─────────────────┐    ┌──────────────┤
//!        │ Google AQ / Wx  │──▶ │              ▼
//!        │  (or synthetic) │    │   ┌──────────┐   ┌──────────┐
//!        └─────────────────┘    └──▶│   CLI    │   │   HTTP   │
//!                                   │ (wsafe)  │   │  (axum)  │
//!                                   └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! wsafe slugs --level state          # list country/state pairs
//! wsafe get us/texas/austin          # print one guide
//! wsafe rollup us texas              # average score and AQI
//! wsafe live us/texas/austin         # live air quality + weather
//! wsafe check                        # vault integrity report
//! wsafe serve                        # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`fs_vault`] | Filesystem-backed document store |
//! | [`get`] | Single-document retrieval |
//! | [`slugs`] | Key enumeration command |
//! | [`rollup`] | Country and state aggregation command |
//! | [`overlay`] | Live air quality and weather providers |
//! | [`sitemap`] | Sitemap XML generation |
//! | [`check`] | Vault integrity check |
//! | [`server`] | HTTP API |
//!
//! The runtime-free model (keys, documents, aggregation, measurement types)
//! lives in the `workout-safety-core` crate.

pub mod check;
pub mod config;
pub mod fs_vault;
pub mod get;
pub mod logging;
pub mod overlay;
pub mod rollup;
pub mod server;
pub mod sitemap;
pub mod slugs;
