use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use log::{trace, warn};
use walkdir::WalkDir;

use crate::io::common::loader::{EnumeratedEntry, ResourceLoader};
use crate::io::error::ResourceError;

/// A plain directory, e.g. the game's `Data/` folder or a mod's content folder. Entry names are
/// the `/` separated paths relative to the root.
pub struct FlatFileLoader {
    root: PathBuf,
    prefix: String,
    description: String,
}

impl FlatFileLoader {
    pub fn new<P: AsRef<Path>>(root: P, prefix: &str) -> Self {
        let root = root.as_ref().to_path_buf();
        let description = format!("directory {}", root.display());
        Self {
            root,
            prefix: prefix.to_string(),
            description,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only plain relative names resolve: `..`, `.`, absolute paths and drive prefixes would
    /// leave (or replace) the root when joined.
    fn entry_path(&self, entry_name: &str) -> Result<PathBuf, ResourceError> {
        let relative = Path::new(entry_name);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if entry_name.is_empty() || !plain {
            return Err(ResourceError::not_found(format!(
                "{} in {}",
                entry_name, self.description
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceLoader for FlatFileLoader {
    fn enumerate(&self) -> Vec<EnumeratedEntry> {
        if !self.root.is_dir() {
            warn!("{} does not exist, skipping", self.description);
            return vec![];
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to walk {}: {}", self.description, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let Some(relative) = relative.to_str() else {
                warn!("Skipping non UTF-8 file name {}", entry.path().display());
                continue;
            };

            entries.push(EnumeratedEntry::new(
                &self.prefix,
                &relative.replace('\\', "/"),
            ));
        }

        entries
    }

    fn fetch(&self, entry_name: &str) -> Result<Vec<u8>, ResourceError> {
        trace!("Loading {} from {}", entry_name, self.description);
        let path = self.entry_path(entry_name)?;
        fs::read(&path).map_err(|e| ResourceError::from_io(path.display().to_string(), e))
    }

    fn modified(&self, entry_name: &str) -> Option<SystemTime> {
        let path = self.entry_path(entry_name).ok()?;
        fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
    }

    fn describe(&self) -> &str {
        &self.description
    }
}
