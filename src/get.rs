//! Single-document retrieval by full geo key.
//!
//! Used by `wsafe get` and by the `/api/guides/{country}/{state}/{city}`
//! endpoint. Returns the parsed frontmatter and body unchanged.

use anyhow::Result;
use workout_safety_core::document::Document;
use workout_safety_core::error::VaultError;
use workout_safety_core::geo::{GeoKey, Scope};
use workout_safety_core::vault::Vault;

use crate::config::Config;
use crate::fs_vault::FsVault;

/// Loads the document at `key`.
///
/// Missing and malformed documents are both [`VaultError::NotFound`].
pub fn get_document(vault: &dyn Vault, key: &GeoKey) -> Result<Document, VaultError> {
    vault
        .load(key)
        .ok_or_else(|| VaultError::NotFound(Scope::City { key: key.clone() }))
}

/// CLI entry point: prints a frontmatter summary followed by the body.
pub fn run_get(config: &Config, path: &str) -> Result<()> {
    let key = GeoKey::parse(path)?;
    let vault = FsVault::from_config(&config.vault);
    let doc = get_document(&vault, &key)?;
    let fm = &doc.frontmatter;

    println!("--- Document ---");
    println!("key:          {}", doc.key);
    println!("title:        {}", fm.title);
    println!("location:     {}, {}, {}", fm.city, fm.state, fm.country);
    println!("coordinates:  {}, {}", fm.lat, fm.lon);
    println!("score:        {}/10", fm.lungs_joints_score);
    println!("pollen:       {}", fm.pollen_level.as_str());
    println!("aqi:          {}", fm.aqi);
    if let Some(pollutant) = &fm.dominant_pollutant {
        println!("pollutant:    {}", pollutant);
    }
    println!("last_updated: {}", fm.last_updated.to_rfc3339());
    if !fm.tags.is_empty() {
        println!("tags:         {}", fm.tags.join(", "));
    }
    if let Some(url) = &fm.canonical_url {
        println!("canonical:    {}", url);
    }
    println!();

    println!("--- Body ---");
    println!("{}", doc.body);

    Ok(())
}
