//! Sitemap generation.
//!
//! Lists the site root, every country page, every state page and every city
//! guide, in that order, each tier with its own change-frequency and
//! priority hint:
//!
//! | Tier    | URL                                  | changefreq | priority |
//! |---------|--------------------------------------|------------|----------|
//! | home    | `{base}`                             | daily      | 1.0      |
//! | country | `{base}/{section}/{country}`         | daily      | 0.8      |
//! | state   | `{base}/{section}/{country}/{state}` | daily      | 0.7      |
//! | city    | `{base}/{section}/{c}/{s}/{city}`    | hourly     | 0.6      |
//!
//! Countries and states appear in first-discovery order, cities in catalog
//! order, so an unmodified vault always yields the same document apart from
//! `lastmod`.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;
use workout_safety_core::catalog::{all_keys, distinct_pairs};
use workout_safety_core::vault::Vault;

use crate::config::{Config, SiteConfig};
use crate::fs_vault::FsVault;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Hourly,
    Daily,
}

impl ChangeFrequency {
    fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
        }
    }
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub changefreq: ChangeFrequency,
    pub priority: f32,
}

/// Collects the sitemap entries for every enumerated page.
pub fn sitemap_entries(vault: &dyn Vault, site: &SiteConfig) -> Vec<SitemapEntry> {
    let base = site.base_url.trim_end_matches('/');
    let section = format!("{}/{}", base, site.section);

    let mut entries = vec![SitemapEntry {
        loc: base.to_string(),
        changefreq: ChangeFrequency::Daily,
        priority: 1.0,
    }];

    let keys = all_keys(vault);
    let pairs = distinct_pairs(&keys);

    let mut seen = HashSet::new();
    for (country, _) in &pairs {
        if seen.insert(country.as_str()) {
            entries.push(SitemapEntry {
                loc: format!("{}/{}", section, country),
                changefreq: ChangeFrequency::Daily,
                priority: 0.8,
            });
        }
    }

    for (country, state) in &pairs {
        entries.push(SitemapEntry {
            loc: format!("{}/{}/{}", section, country, state),
            changefreq: ChangeFrequency::Daily,
            priority: 0.7,
        });
    }

    for key in &keys {
        entries.push(SitemapEntry {
            loc: format!("{}/{}", section, key),
            changefreq: ChangeFrequency::Hourly,
            priority: 0.6,
        });
    }

    entries
}

/// Renders `entries` as sitemap XML, stamping each with `lastmod`.
pub fn render_sitemap(entries: &[SitemapEntry], lastmod: DateTime<Utc>) -> Result<String> {
    let lastmod = lastmod.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        write_text_element(&mut writer, "lastmod", &lastmod)?;
        write_text_element(&mut writer, "changefreq", entry.changefreq.as_str())?;
        write_text_element(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let bytes = writer.into_inner().into_inner();
    let mut xml = String::from_utf8(bytes).context("sitemap is not valid UTF-8")?;
    xml.push('\n');
    Ok(xml)
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Builds the full sitemap for `vault`.
pub fn build_sitemap(vault: &dyn Vault, site: &SiteConfig, lastmod: DateTime<Utc>) -> Result<String> {
    render_sitemap(&sitemap_entries(vault, site), lastmod)
}

/// CLI entry point: writes the sitemap to `out`, or stdout when absent.
pub fn run_sitemap(config: &Config, out: Option<&Path>) -> Result<()> {
    let vault = FsVault::from_config(&config.vault);
    let xml = build_sitemap(&vault, &config.site, Utc::now())?;

    match out {
        Some(path) => {
            std::fs::write(path, &xml)
                .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;
            info!(path = %path.display(), "sitemap written");
        }
        None => print!("{}", xml),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use workout_safety_core::geo::GeoKey;
    use workout_safety_core::vault::memory::InMemoryVault;

    fn doc(city: &str) -> String {
        format!(
            "---\ntitle: \"{city}\"\ndescription: \"d\"\ncity: \"{city}\"\nstate: \"s\"\ncountry: \"c\"\nlat: 1.0\nlon: 2.0\nlungsJointsScore: 5\npollenLevel: \"Low\"\naqi: 30\nlastUpdated: \"2025-01-01T00:00:00Z\"\ntags: []\n---\n"
        )
    }

    fn fixture() -> InMemoryVault {
        let key = |p: &str| GeoKey::parse(p).unwrap();
        InMemoryVault::new()
            .with(key("us/texas/austin"), doc("Austin"))
            .with(key("us/texas/dallas"), doc("Dallas"))
            .with(key("us/ohio/akron"), doc("Akron"))
            .with(key("au/victoria/melbourne"), doc("Melbourne"))
            .with(key("au/victoria/geelong"), "not a document")
    }

    #[test]
    fn test_entries_tiers_and_order() {
        let entries = sitemap_entries(&fixture(), &SiteConfig::default());
        let locs: Vec<&str> = entries.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec![
                "https://healthislife.work",
                "https://healthislife.work/workout-safety/us",
                "https://healthislife.work/workout-safety/au",
                "https://healthislife.work/workout-safety/us/texas",
                "https://healthislife.work/workout-safety/us/ohio",
                "https://healthislife.work/workout-safety/au/victoria",
                "https://healthislife.work/workout-safety/us/texas/austin",
                "https://healthislife.work/workout-safety/us/texas/dallas",
                "https://healthislife.work/workout-safety/us/ohio/akron",
                "https://healthislife.work/workout-safety/au/victoria/melbourne",
            ]
        );
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[1].priority, 0.8);
        assert_eq!(entries[3].priority, 0.7);
        assert_eq!(entries[6].priority, 0.6);
        assert_eq!(entries[6].changefreq, ChangeFrequency::Hourly);
        assert_eq!(entries[3].changefreq, ChangeFrequency::Daily);
    }

    #[test]
    fn test_empty_vault_lists_only_home() {
        let entries = sitemap_entries(&InMemoryVault::new(), &SiteConfig::default());
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_render_xml() {
        let lastmod = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let xml = build_sitemap(&fixture(), &SiteConfig::default(), lastmod).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert!(xml.contains("<loc>https://healthislife.work/workout-safety/us/ohio/akron</loc>"));
        assert!(xml.contains("<lastmod>2025-03-01T12:00:00Z</lastmod>"));
        assert!(xml.contains("<changefreq>hourly</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<url>").count(), 10);
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_trailing_slash_base_url() {
        let site = SiteConfig {
            base_url: "https://example.org/".to_string(),
            section: "guides".to_string(),
        };
        let entries = sitemap_entries(&fixture(), &site);
        assert_eq!(entries[0].loc, "https://example.org");
        assert_eq!(entries[1].loc, "https://example.org/guides/us");
    }
}
