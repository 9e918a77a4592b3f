use std::path::Path;
use std::time::SystemTime;

use crate::io::common::loader::{EnumeratedEntry, ResourceLoader};
use crate::io::error::ResourceError;
use crate::io::flat::loader::FlatFileLoader;
use crate::io::lod::loader::{LodLoader, SoundLoader, VideoLoader};

/// The set of physical stores the filesystem can be built from.
pub enum ArchiveBackend {
    FlatFile(FlatFileLoader),
    Lod(LodLoader),
    Sound(SoundLoader),
    Video(VideoLoader),
}

impl ArchiveBackend {
    /// Picks the container type by the file extension (`.lod`, `.snd`, `.vid`, case-insensitive).
    pub fn open_by_extension<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "lod" => Ok(ArchiveBackend::Lod(LodLoader::open(path, prefix)?)),
            "snd" => Ok(ArchiveBackend::Sound(SoundLoader::open(path, prefix)?)),
            "vid" => Ok(ArchiveBackend::Video(VideoLoader::open(path, prefix)?)),
            _ => Err(ResourceError::not_found(format!(
                "archive type of {}",
                path.display()
            ))),
        }
    }

    pub fn flat<P: AsRef<Path>>(root: P, prefix: &str) -> Self {
        ArchiveBackend::FlatFile(FlatFileLoader::new(root, prefix))
    }

    fn loader(&self) -> &dyn ResourceLoader {
        match self {
            ArchiveBackend::FlatFile(loader) => loader,
            ArchiveBackend::Lod(loader) => loader,
            ArchiveBackend::Sound(loader) => loader,
            ArchiveBackend::Video(loader) => loader,
        }
    }
}

impl ResourceLoader for ArchiveBackend {
    fn enumerate(&self) -> Vec<EnumeratedEntry> {
        self.loader().enumerate()
    }

    fn fetch(&self, entry_name: &str) -> Result<Vec<u8>, ResourceError> {
        self.loader().fetch(entry_name)
    }

    fn modified(&self, entry_name: &str) -> Option<SystemTime> {
        self.loader().modified(entry_name)
    }

    fn describe(&self) -> &str {
        self.loader().describe()
    }
}
