use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use workout_safety_core::geo::is_slug;

use crate::overlay::ProviderCredentials;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub vault: VaultConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    pub root: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_extension() -> String {
    "mdx".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_section")]
    pub section: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            section: default_section(),
        }
    }
}

fn default_base_url() -> String {
    "https://healthislife.work".to_string()
}
fn default_section() -> String {
    "workout-safety".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverlayConfig {
    /// Environment variable holding the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            air_quality_url: default_air_quality_url(),
            weather_url: default_weather_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_MAPS_API_KEY".to_string()
}
fn default_air_quality_url() -> String {
    "https://airquality.googleapis.com".to_string()
}
fn default_weather_url() -> String {
    "https://weather.googleapis.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Config rooted at `vault_root` with every other section defaulted.
    pub fn for_vault(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault: VaultConfig {
                root: vault_root.into(),
                extension: default_extension(),
                follow_symlinks: false,
            },
            site: SiteConfig::default(),
            server: ServerConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }

    /// Reads provider credentials from the configured environment variable.
    ///
    /// An unset or blank variable means "no provider": overlays synthesize.
    pub fn resolve_credentials(&self) -> Option<ProviderCredentials> {
        std::env::var(&self.overlay.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(ProviderCredentials::new)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate vault
    if config.vault.extension.is_empty() || config.vault.extension.starts_with('.') {
        anyhow::bail!("vault.extension must be non-empty and must not start with '.'");
    }

    // Validate site
    if !(config.site.base_url.starts_with("http://") || config.site.base_url.starts_with("https://"))
    {
        anyhow::bail!(
            "site.base_url must start with http:// or https:// (got '{}')",
            config.site.base_url
        );
    }
    if !is_slug(&config.site.section) {
        anyhow::bail!(
            "site.section must be a lowercase hyphenated slug (got '{}')",
            config.site.section
        );
    }

    // Validate overlay
    if config.overlay.timeout_secs == 0 {
        anyhow::bail!("overlay.timeout_secs must be > 0");
    }

    Ok(())
}
