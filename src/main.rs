//! # Workout Safety CLI (`wsafe`)
//!
//! ## Usage
//!
//! ```bash
//! wsafe --config ./config/wsafe.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wsafe slugs [--level country\|state\|city]` | List enumerated keys |
//! | `wsafe get <country/state/city>` | Print one guide |
//! | `wsafe rollup <country> [state]` | Average score and AQI over a scope |
//! | `wsafe live <country/state/city>` | Live air quality and weather for a guide |
//! | `wsafe live --lat <lat> --lon <lon>` | Live air quality and weather for a coordinate |
//! | `wsafe sitemap [--out <path>]` | Write sitemap XML |
//! | `wsafe check` | Vault integrity report |
//! | `wsafe serve` | Start the HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! # Everything under Texas
//! wsafe rollup us texas --config ./config/wsafe.toml
//!
//! # Live readings without an API key are synthesized from the coordinate
//! wsafe live --lat 30.2672 --lon -97.7431
//!
//! # Regenerate the sitemap
//! wsafe sitemap --out public/sitemap.xml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use workout_safety::overlay::LiveTarget;
use workout_safety::slugs::SlugLevel;
use workout_safety::{check, config, get, logging, overlay, rollup, server, sitemap, slugs};
use workout_safety_core::live::Coordinate;

/// Workout Safety CLI: city workout-safety guides with live air quality
/// and weather.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/wsafe.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "wsafe",
    about = "Workout Safety — city guides with live air quality and weather",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/wsafe.toml")]
    config: PathBuf,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List enumerated keys at one level.
    Slugs {
        #[arg(long, value_enum, default_value = "city")]
        level: SlugLevel,
    },

    /// Print one guide's frontmatter summary and body.
    Get {
        /// `country/state/city`
        key: String,
    },

    /// Print aggregate stats for a country, or a state when given.
    ///
    /// Exits non-zero when nothing valid lives beneath the scope.
    Rollup { country: String, state: Option<String> },

    /// Fetch live air quality and weather concurrently and print JSON.
    ///
    /// Without an API key in the configured environment variable the
    /// readings are synthesized from the coordinate.
    Live {
        /// `country/state/city` whose coordinate to use.
        #[arg(required_unless_present = "lat", conflicts_with_all = ["lat", "lon"])]
        key: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Write the sitemap to a file, or stdout.
    Sitemap {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Report malformed, misplaced and badly marked-up vault files.
    Check,

    /// Start the HTTP API server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Slugs { level } => {
            slugs::run_slugs(&cfg, level)?;
        }
        Commands::Get { key } => {
            get::run_get(&cfg, &key)?;
        }
        Commands::Rollup { country, state } => {
            rollup::run_rollup(&cfg, &country, state.as_deref())?;
        }
        Commands::Live { key, lat, lon } => {
            let target = match (key, lat, lon) {
                (Some(key), _, _) => LiveTarget::Key(key),
                (None, Some(lat), Some(lon)) => LiveTarget::Coordinate(Coordinate::new(lat, lon)),
                _ => anyhow::bail!("live needs a country/state/city key or both --lat and --lon"),
            };
            overlay::run_live(&cfg, target).await?;
        }
        Commands::Sitemap { out } => {
            sitemap::run_sitemap(&cfg, out.as_deref())?;
        }
        Commands::Check => {
            check::run_check(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
