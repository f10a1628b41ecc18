//! `wsafe rollup`: aggregate stats for a country or a state.

use anyhow::Result;
use workout_safety_core::aggregate::{country_rollup, state_rollup, AggregateRollup};
use workout_safety_core::error::VaultError;
use workout_safety_core::geo::{display_name, validate_slug};
use workout_safety_core::vault::Vault;

use crate::config::Config;
use crate::fs_vault::FsVault;

/// Rollup for `country`, or for `country/state` when `state` is given.
pub fn rollup_for(
    vault: &dyn Vault,
    country: &str,
    state: Option<&str>,
) -> Result<AggregateRollup, VaultError> {
    validate_slug(country)?;
    match state {
        Some(state) => {
            validate_slug(state)?;
            state_rollup(vault, country, state)
        }
        None => country_rollup(vault, country),
    }
}

/// CLI entry point: prints the means and the covered documents.
pub fn run_rollup(config: &Config, country: &str, state: Option<&str>) -> Result<()> {
    let vault = FsVault::from_config(&config.vault);
    let rollup = rollup_for(&vault, country, state)?;

    let heading = match state {
        Some(state) => format!("{}, {}", display_name(state), country.to_uppercase()),
        None => country.to_uppercase(),
    };
    println!("{} — Workout Safety Rollup", heading);
    println!();
    println!("  Documents:     {}", rollup.stats.document_count);
    println!("  Average score: {:.1}/10", rollup.stats.average_score);
    println!("  Average AQI:   {:.0}", rollup.stats.average_aqi);

    for group in &rollup.groups {
        println!();
        println!("  {}", display_name(&group.state));
        for doc in &group.entries {
            let fm = &doc.frontmatter;
            println!(
                "    {:<24} score {:>4}  aqi {:>4}  pollen {}",
                fm.city,
                fm.lungs_joints_score,
                fm.aqi,
                fm.pollen_level.as_str()
            );
        }
    }

    Ok(())
}
