use std::path::Path;

use itertools::Itertools;
use ::lod::{LodArchive, SndArchive, VidArchive};
use log::trace;

use crate::io::common::loader::{EnumeratedEntry, ResourceLoader};
use crate::io::error::ResourceError;

/// Reads the game's compressed LOD containers (`H3bitmap.lod`, `H3sprite.lod`, ...).
pub struct LodLoader {
    archive: LodArchive,
    prefix: String,
    description: String,
}

impl LodLoader {
    pub fn open<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let archive = LodArchive::open(path).map_err(|e| ResourceError::from_io(path.display().to_string(), e))?;
        Ok(Self {
            archive,
            prefix: prefix.to_string(),
            description: format!("LOD {}", path.display()),
        })
    }
}

impl ResourceLoader for LodLoader {
    fn enumerate(&self) -> Vec<EnumeratedEntry> {
        self.archive
            .entries()
            .iter()
            .map(|entry| EnumeratedEntry::new(&self.prefix, &entry.name))
            .collect_vec()
    }

    fn fetch(&self, entry_name: &str) -> Result<Vec<u8>, ResourceError> {
        trace!("Loading {} from {}", entry_name, self.description);
        self.archive
            .read_file(entry_name)
            .map_err(|e| ResourceError::from_io(format!("{} in {}", entry_name, self.description), e))
    }

    fn describe(&self) -> &str {
        &self.description
    }
}

/// Sound container (`Heroes3.snd`), entries are stored uncompressed.
pub struct SoundLoader {
    archive: SndArchive,
    prefix: String,
    description: String,
}

impl SoundLoader {
    pub fn open<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let archive = SndArchive::open(path).map_err(|e| ResourceError::from_io(path.display().to_string(), e))?;
        Ok(Self {
            archive,
            prefix: prefix.to_string(),
            description: format!("SND {}", path.display()),
        })
    }
}

impl ResourceLoader for SoundLoader {
    fn enumerate(&self) -> Vec<EnumeratedEntry> {
        self.archive
            .entries()
            .iter()
            .map(|entry| EnumeratedEntry::new(&self.prefix, &entry.name))
            .collect_vec()
    }

    fn fetch(&self, entry_name: &str) -> Result<Vec<u8>, ResourceError> {
        trace!("Loading {} from {}", entry_name, self.description);
        self.archive
            .read_file(entry_name)
            .map_err(|e| ResourceError::from_io(format!("{} in {}", entry_name, self.description), e))
    }

    fn describe(&self) -> &str {
        &self.description
    }
}

/// Video container (`VIDEO.VID`), entries are stored uncompressed.
pub struct VideoLoader {
    archive: VidArchive,
    prefix: String,
    description: String,
}

impl VideoLoader {
    pub fn open<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let archive = VidArchive::open(path).map_err(|e| ResourceError::from_io(path.display().to_string(), e))?;
        Ok(Self {
            archive,
            prefix: prefix.to_string(),
            description: format!("VID {}", path.display()),
        })
    }
}

impl ResourceLoader for VideoLoader {
    fn enumerate(&self) -> Vec<EnumeratedEntry> {
        self.archive
            .entries()
            .iter()
            .map(|entry| EnumeratedEntry::new(&self.prefix, &entry.name))
            .collect_vec()
    }

    fn fetch(&self, entry_name: &str) -> Result<Vec<u8>, ResourceError> {
        trace!("Loading {} from {}", entry_name, self.description);
        self.archive
            .read_file(entry_name)
            .map_err(|e| ResourceError::from_io(format!("{} in {}", entry_name, self.description), e))
    }

    fn describe(&self) -> &str {
        &self.description
    }
}
