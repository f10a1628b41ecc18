//! Vault integrity check.
//!
//! Walks every file under the vault root and reports:
//!
//! - vault-extension files that are not at `{country}/{state}/{city}` or
//!   whose names are not slugs (the enumerator silently skips these)
//! - documents whose frontmatter fails to parse, with the reason
//! - `<BulletList>` / `<AlertBox>` open and close counts that differ
//! - a bare `<` followed by a digit in the body, which MDX reads as a
//!   broken tag (`(<2.5µm)` should be written `(&lt;2.5µm)`)
//!
//! The check is read-only.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};
use walkdir::WalkDir;
use workout_safety_core::document::{split_frontmatter, Document};

use crate::config::Config;
use crate::fs_vault::FsVault;

/// Component tags whose open/close counts must match.
const BALANCED_TAGS: &[&str] = &["BulletList", "AlertBox"];

#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    Misplaced,
    Malformed(String),
    UnbalancedTag {
        tag: &'static str,
        open: usize,
        close: usize,
    },
    BareAngle {
        line: usize,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Misplaced => write!(f, "not at country/state/city with slug names"),
            IssueKind::Malformed(reason) => write!(f, "malformed frontmatter: {}", reason),
            IssueKind::UnbalancedTag { tag, open, close } => {
                write!(f, "<{}> count mismatch ({} open, {} close)", tag, open, close)
            }
            IssueKind::BareAngle { line } => {
                write!(f, "line {}: bare '<' before a digit, use &lt;", line)
            }
        }
    }
}

/// A problem found in one file. `path` is relative to the vault root.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub path: PathBuf,
    pub kind: IssueKind,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    /// Files with the vault extension that were examined.
    pub files: usize,
    /// Files that parsed into documents.
    pub documents: usize,
    pub issues: Vec<Issue>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Walks the vault and collects every issue.
pub fn check_vault(vault: &FsVault) -> CheckReport {
    let mut report = CheckReport::default();
    let root = vault.root();
    if !root.is_dir() {
        warn!(root = %root.display(), "vault root is not a directory");
        return report;
    }

    let suffix = format!(".{}", vault.extension());
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable vault entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let is_document = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix));
        if !is_document {
            debug!(path = %relative.display(), "ignoring non-document file");
            continue;
        }
        report.files += 1;

        let Some(key) = vault.key_for(path) else {
            report.issues.push(Issue {
                path: relative,
                kind: IssueKind::Misplaced,
            });
            continue;
        };

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                report.issues.push(Issue {
                    path: relative,
                    kind: IssueKind::Malformed(e.to_string()),
                });
                continue;
            }
        };

        if let Err(e) = Document::parse(key, &raw) {
            report.issues.push(Issue {
                path: relative,
                kind: IssueKind::Malformed(e.to_string()),
            });
            continue;
        }
        report.documents += 1;

        for kind in scan_body(&raw) {
            report.issues.push(Issue {
                path: relative.clone(),
                kind,
            });
        }
    }
    report
}

/// Checks component-tag balance and bare angles in the body of `raw`.
///
/// Line numbers are 1-based and count from the top of the file.
pub fn scan_body(raw: &str) -> Vec<IssueKind> {
    let body = match split_frontmatter(raw) {
        Ok((_, body)) => body,
        Err(_) => raw,
    };
    let line_offset = raw[..raw.len() - body.len()].matches('\n').count();

    let mut issues = Vec::new();
    for &tag in BALANCED_TAGS {
        let open = count_open_tags(body, tag);
        let close = body.matches(&format!("</{}>", tag)).count();
        if open != close {
            issues.push(IssueKind::UnbalancedTag { tag, open, close });
        }
    }

    for (index, line) in body.lines().enumerate() {
        if has_bare_angle(line) {
            issues.push(IssueKind::BareAngle {
                line: line_offset + index + 1,
            });
        }
    }
    issues
}

/// Counts `<Tag>` and `<Tag attr=...>`, but not `<TagSuffix>`.
fn count_open_tags(body: &str, tag: &str) -> usize {
    let needle = format!("<{}", tag);
    body.match_indices(&needle)
        .filter(|(at, _)| {
            matches!(
                body[at + needle.len()..].chars().next(),
                Some('>') | Some('/') | Some(' ') | Some('\t') | Some('\n') | Some('\r')
            )
        })
        .count()
}

fn has_bare_angle(line: &str) -> bool {
    line.match_indices('<').any(|(at, _)| {
        line[at + 1..]
            .trim_start()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// CLI entry point: prints the report; fails when any issue was found.
pub fn run_check(config: &Config) -> Result<()> {
    let vault = FsVault::from_config(&config.vault);
    let report = check_vault(&vault);

    for issue in &report.issues {
        println!("{}: {}", issue.path.display(), issue.kind);
    }
    println!();
    println!(
        "Checked {} files under {}: {} documents, {} issues.",
        report.files,
        vault.root().display(),
        report.documents,
        report.issues.len()
    );

    if !report.is_clean() {
        anyhow::bail!("vault check found {} issues", report.issues.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const FRONTMATTER: &str = "---\ntitle: \"Austin\"\ndescription: \"d\"\ncity: \"Austin\"\nstate: \"Texas\"\ncountry: \"us\"\nlat: 30.2\nlon: -97.7\nlungsJointsScore: 7\npollenLevel: \"Moderate\"\naqi: 42\nlastUpdated: \"2025-03-01T12:00:00Z\"\ntags: []\n---\n";

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_clean_body() {
        let raw = format!(
            "{FRONTMATTER}\n<BulletList>\n- fine &lt;2.5µm\n</BulletList>\n<AlertBox type=\"warning\">\nhi\n</AlertBox>\n"
        );
        assert!(scan_body(&raw).is_empty());
    }

    #[test]
    fn test_scan_unbalanced_tags() {
        let raw = format!("{FRONTMATTER}<BulletList>\n- a\n<AlertBox type=\"x\">\n</AlertBox>\n");
        assert_eq!(
            scan_body(&raw),
            vec![IssueKind::UnbalancedTag {
                tag: "BulletList",
                open: 1,
                close: 0
            }]
        );
    }

    #[test]
    fn test_scan_ignores_prefixed_tag_names() {
        let raw = format!("{FRONTMATTER}<BulletListItem>\n");
        assert!(scan_body(&raw).is_empty());
    }

    #[test]
    fn test_scan_bare_angle_line_numbers() {
        let raw = format!("{FRONTMATTER}\nPM2.5 (<2.5µm) is high.\nok\nvalue < 10\n");
        let fm_lines = FRONTMATTER.matches('\n').count();
        assert_eq!(
            scan_body(&raw),
            vec![
                IssueKind::BareAngle { line: fm_lines + 2 },
                IssueKind::BareAngle { line: fm_lines + 4 },
            ]
        );
    }

    #[test]
    fn test_check_vault_reports_each_kind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "us/texas/austin.mdx", FRONTMATTER);
        write(root, "us/texas/waco.mdx", "no frontmatter here");
        write(root, "us/texas/Bad Name.mdx", FRONTMATTER);
        write(root, "us/stray.mdx", FRONTMATTER);
        write(root, "us/texas/notes.txt", "ignored");
        write(
            root,
            "us/ohio/akron.mdx",
            &format!("{FRONTMATTER}<AlertBox>\n(<10µm)\n"),
        );

        let report = check_vault(&FsVault::new(root, "mdx"));
        assert_eq!(report.files, 5);
        assert_eq!(report.documents, 2);

        let kinds: Vec<(String, &IssueKind)> = report
            .issues
            .iter()
            .map(|i| (i.path.to_string_lossy().replace('\\', "/"), &i.kind))
            .collect();
        assert!(kinds
            .iter()
            .any(|(p, k)| p == "us/stray.mdx" && **k == IssueKind::Misplaced));
        assert!(kinds
            .iter()
            .any(|(p, k)| p == "us/texas/Bad Name.mdx" && **k == IssueKind::Misplaced));
        assert!(kinds
            .iter()
            .any(|(p, k)| p == "us/texas/waco.mdx" && matches!(k, IssueKind::Malformed(_))));
        assert!(kinds.iter().any(|(p, k)| p == "us/ohio/akron.mdx"
            && matches!(k, IssueKind::UnbalancedTag { tag: "AlertBox", .. })));
        assert!(kinds
            .iter()
            .any(|(p, k)| p == "us/ohio/akron.mdx" && matches!(k, IssueKind::BareAngle { .. })));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_missing_root_is_empty_report() {
        let report = check_vault(&FsVault::new("/definitely/not/here", "mdx"));
        assert_eq!(report.files, 0);
        assert!(report.is_clean());
    }
}
