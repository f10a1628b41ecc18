//! Filesystem-backed [`Vault`].
//!
//! Layout: `root/{country}/{state}/{city}.{ext}`. The walk descends exactly
//! three levels, sorted by file name at each level, so discovery order is
//! stable for an unmodified tree. Directories and files whose names are not
//! slugs are skipped; so is anything at the wrong depth.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use workout_safety_core::document::{Document, DocumentError};
use workout_safety_core::geo::GeoKey;
use workout_safety_core::vault::Vault;

use crate::config::VaultConfig;

/// Read-only vault over a directory tree.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    extension: String,
    follow_symlinks: bool,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            follow_symlinks: false,
        }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self {
            root: config.root.clone(),
            extension: config.extension.clone(),
            follow_symlinks: config.follow_symlinks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the document file for `key`.
    ///
    /// Key components are slugs by construction, so the result always stays
    /// under the root.
    pub fn path_for(&self, key: &GeoKey) -> PathBuf {
        self.root
            .join(key.country())
            .join(key.state())
            .join(format!("{}.{}", key.city(), self.extension))
    }

    /// Derives the key for a file at depth three, if its names are slugs and
    /// its extension matches.
    pub fn key_for(&self, path: &Path) -> Option<GeoKey> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<&str>>>()?;
        let [country, state, file] = parts.as_slice() else {
            return None;
        };
        let city = file.strip_suffix(&format!(".{}", self.extension))?;
        GeoKey::new(*country, *state, city).ok()
    }

    /// Whether any component below the root is a symlink. Without
    /// `follow_symlinks` the walk never reaches such paths, and neither may
    /// loading.
    fn crosses_symlink(&self, key: &GeoKey) -> bool {
        let country = self.root.join(key.country());
        let state = country.join(key.state());
        let file = self.path_for(key);
        [country, state, file].iter().any(|path| {
            std::fs::symlink_metadata(path)
                .map(|meta| meta.file_type().is_symlink())
                .unwrap_or(false)
        })
    }

    /// Reads and parses one file, keeping the parse error.
    ///
    /// [`Vault::load`] folds the error into `None`; the integrity check uses
    /// this to report why.
    pub fn read(&self, key: &GeoKey) -> Result<Option<Document>, DocumentError> {
        let path = self.path_for(key);
        if !self.follow_symlinks && self.crosses_symlink(key) {
            debug!(key = %key, "document path crosses a symlink, not loading");
            return Ok(None);
        }
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable vault file");
                return Ok(None);
            }
        };
        Document::parse(key.clone(), &raw).map(Some)
    }
}

impl Vault for FsVault {
    fn candidates(&self) -> Vec<GeoKey> {
        if !self.root.is_dir() {
            debug!(root = %self.root.display(), "vault root missing, nothing to enumerate");
            return Vec::new();
        }

        let walker = WalkDir::new(&self.root)
            .min_depth(3)
            .max_depth(3)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        let mut keys = Vec::new();
        for entry in walker {
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
            match self.key_for(entry.path()) {
                Some(key) => keys.push(key),
                None => debug!(path = %entry.path().display(), "not a vault document"),
            }
        }
        keys
    }

    fn load(&self, key: &GeoKey) -> Option<Document> {
        match self.read(key) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(key = %key, error = %e, "skipping malformed document");
                None
            }
        }
    }
}
