use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn wsafe_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wsafe"))
}

fn guide(city: &str, state: &str, lat: f64, lon: f64, score: u32, aqi: u32) -> String {
    format!(
        r#"---
title: "{city}, {state} Workout Safety Guide"
description: "Should you work out outside in {city} today?"
city: "{city}"
state: "{state}"
country: "us"
lat: {lat}
lon: {lon}
lungsJointsScore: {score}
pollenLevel: "Moderate"
aqi: {aqi}
lastUpdated: "2025-03-01T12:00:00Z"
tags: ["outdoor workout"]
---

## Running in {city}

<BulletList>
- Go early.
</BulletList>
"#
    )
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let vault = root.join("vault");
    let write = |rel: &str, content: &str| {
        let path = vault.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    };
    write(
        "us/texas/austin.mdx",
        &guide("Austin", "Texas", 30.2672, -97.7431, 7, 40),
    );
    write(
        "us/texas/dallas.mdx",
        &guide("Dallas", "Texas", 32.7767, -96.797, 9, 60),
    );
    write(
        "us/california/fresno.mdx",
        &guide("Fresno", "California", 36.7378, -119.7871, 4, 120),
    );
    write("us/texas/waco.mdx", "title: no fences at all\n");

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[vault]
root = "{}/vault"

[server]
bind = "127.0.0.1:0"

[overlay]
api_key_env = "WSAFE_INTEGRATION_NO_SUCH_KEY"
"#,
        root.display()
    );
    let config_path = config_dir.join("wsafe.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_wsafe(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = wsafe_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("WSAFE_INTEGRATION_NO_SUCH_KEY")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run wsafe binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_slugs_lists_valid_cities_in_walk_order() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wsafe(&config_path, &["slugs"]);
    assert!(success, "slugs failed: {}", stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["us/california/fresno", "us/texas/austin", "us/texas/dallas"]
    );
}

#[test]
fn test_slugs_country_and_state_levels() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wsafe(&config_path, &["slugs", "--level", "country"]);
    assert!(success);
    assert_eq!(stdout.trim(), "us");

    let (stdout, _, success) = run_wsafe(&config_path, &["slugs", "--level", "state"]);
    assert!(success);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["us/california", "us/texas"]
    );
}

#[test]
fn test_get_prints_document() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wsafe(&config_path, &["get", "us/texas/austin"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("title:        Austin, Texas Workout Safety Guide"));
    assert!(stdout.contains("aqi:          40"));
    assert!(stdout.contains("## Running in Austin"));
}

#[test]
fn test_get_malformed_is_not_found() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_wsafe(&config_path, &["get", "us/texas/waco"]);
    assert!(!success);
    assert!(stderr.contains("not found"), "stderr: {}", stderr);
}

#[test]
fn test_get_rejects_traversal() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_wsafe(&config_path, &["get", "us/../../etc"]);
    assert!(!success);
    assert!(stderr.contains("invalid slug"), "stderr: {}", stderr);
}

#[test]
fn test_rollup_state() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wsafe(&config_path, &["rollup", "us", "texas"]);
    assert!(success, "rollup failed: {}", stderr);
    assert!(stdout.contains("Documents:     2"));
    assert!(stdout.contains("Average score: 8.0/10"));
    assert!(stdout.contains("Average AQI:   50"));
    assert!(stdout.contains("Austin"));
    assert!(!stdout.contains("Waco"));
}

#[test]
fn test_rollup_empty_scope_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_wsafe(&config_path, &["rollup", "us", "nevada"]);
    assert!(!success);
    assert!(stderr.contains("not found: us/nevada"), "stderr: {}", stderr);
}

#[test]
fn test_live_without_key_is_synthetic_and_deterministic() {
    let (_tmp, config_path) = setup_test_env();

    let (first, stderr, success) = run_wsafe(&config_path, &["live", "us/texas/austin"]);
    assert!(success, "live failed: {}", stderr);
    let (second, _, _) = run_wsafe(&config_path, &["live", "us/texas/austin"]);
    assert_eq!(first, second);

    let report: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(report["airQuality"]["source"], "synthetic");
    assert_eq!(report["airQuality"]["dominantPollutant"], "PM2.5");
    assert_eq!(report["weather"]["source"], "synthetic");
    assert_eq!(report["weather"]["conditions"], "Partly Cloudy");
    let aqi = report["airQuality"]["aqi"].as_u64().unwrap();
    assert!((10..=159).contains(&aqi));
}

#[test]
fn test_live_by_coordinate() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_wsafe(&config_path, &["live", "--lat", "10", "--lon", "-2"]);
    assert!(success, "live failed: {}", stderr);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["coordinate"]["lat"], 10.0);
    // seed = |10 * -2| = 20
    assert_eq!(report["weather"]["temperature"], 30.0);
    assert_eq!(report["weather"]["windSpeed"], 5.0);
}

#[test]
fn test_sitemap_to_file() {
    let (tmp, config_path) = setup_test_env();
    let out = tmp.path().join("sitemap.xml");

    let (_, stderr, success) =
        run_wsafe(&config_path, &["sitemap", "--out", out.to_str().unwrap()]);
    assert!(success, "sitemap failed: {}", stderr);

    let xml = fs::read_to_string(out).unwrap();
    assert!(xml.contains("<loc>https://healthislife.work</loc>"));
    assert!(xml.contains("<loc>https://healthislife.work/workout-safety/us/texas/dallas</loc>"));
    assert!(!xml.contains("waco"));
    assert_eq!(xml.matches("<url>").count(), 1 + 1 + 2 + 3);
}

#[test]
fn test_check_reports_malformed_file() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wsafe(&config_path, &["check"]);
    assert!(!success);
    assert!(stdout.contains("waco.mdx: malformed frontmatter"));
    assert!(stdout.contains("3 documents, 1 issues"));
}

#[test]
fn test_missing_config_fails() {
    let (tmp, _) = setup_test_env();
    let missing = tmp.path().join("nope.toml");

    let (_, stderr, success) = run_wsafe(&missing, &["slugs"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
