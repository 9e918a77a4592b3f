use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::util::{invalid_data, name_from_bytes, not_found, read_at};

const MEDIA_NAME_SIZE: usize = 40;
const SND_ENTRY_SIZE: u64 = MEDIA_NAME_SIZE as u64 + 8;
const VID_ENTRY_SIZE: u64 = MEDIA_NAME_SIZE as u64 + 4;
const VID_MINIMUM_SIZE: u64 = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

/// Shared by the sound and the video container: a flat catalog of uncompressed byte ranges.
struct MediaArchive {
    path: PathBuf,
    entries: Vec<MediaEntry>,
    lookup: HashMap<String, usize>,
    file: Mutex<File>,
}

impl MediaArchive {
    fn new(path: PathBuf, entries: Vec<MediaEntry>, file: File, file_len: u64) -> Result<Self> {
        let mut lookup = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.offset as u64 + entry.size as u64 > file_len {
                return Err(invalid_data(format!(
                    "{} in {} points outside of the archive",
                    entry.name,
                    path.display()
                )));
            }
            lookup.insert(entry.name.to_ascii_uppercase(), index);
        }

        Ok(Self {
            path,
            entries,
            lookup,
            file: Mutex::new(file),
        })
    }

    fn entry(&self, name: &str) -> Option<&MediaEntry> {
        self.lookup
            .get(&name.to_ascii_uppercase())
            .map(|index| &self.entries[*index])
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.entry(name).ok_or_else(|| not_found(name))?;
        read_at(&self.file, entry.offset as u64, entry.size as usize)
    }
}

fn read_count(file: &mut File, entry_size: u64, file_len: u64, path: &Path) -> Result<u64> {
    let count = file.read_u32::<LittleEndian>()? as u64;
    if 4 + count * entry_size > file_len {
        return Err(invalid_data(format!(
            "{} declares {} entries, which exceed the file",
            path.display(),
            count
        )));
    }
    Ok(count)
}

/// The sound name field stores `NAME\0EXT`, the extension being separated by a NUL instead of a dot.
fn snd_entry_name(raw: &[u8]) -> String {
    let name = name_from_bytes(raw);
    if name.contains('.') {
        return name;
    }

    let extension = raw
        .iter()
        .position(|&c| c == 0)
        .map(|nul| name_from_bytes(&raw[nul + 1..]))
        .filter(|ext| !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "WAV".to_string());

    format!("{}.{}", name, extension)
}

pub struct SndArchive {
    inner: MediaArchive,
}

impl SndArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        let count = read_count(&mut file, SND_ENTRY_SIZE, file_len, &path)?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut name = [0u8; MEDIA_NAME_SIZE];
            file.read_exact(&mut name)?;
            entries.push(MediaEntry {
                name: snd_entry_name(&name),
                offset: file.read_u32::<LittleEndian>()?,
                size: file.read_u32::<LittleEndian>()?,
            });
        }

        Ok(Self {
            inner: MediaArchive::new(path, entries, file, file_len)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.inner.entries
    }

    pub fn entry(&self, name: &str) -> Option<&MediaEntry> {
        self.inner.entry(name)
    }

    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.inner.read_file(name)
    }
}

pub struct VidArchive {
    inner: MediaArchive,
}

impl VidArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        if file_len < VID_MINIMUM_SIZE {
            return Err(invalid_data(format!(
                "{} doesn't contain a video catalog",
                path.display()
            )));
        }
        let count = read_count(&mut file, VID_ENTRY_SIZE, file_len, &path)?;

        let mut catalog = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut name = [0u8; MEDIA_NAME_SIZE];
            file.read_exact(&mut name)?;
            catalog.push((name_from_bytes(&name), file.read_u32::<LittleEndian>()?));
        }

        // There is no size, so it's the distance to the next entry (or to the end of the file)
        let mut entries = Vec::with_capacity(catalog.len());
        for (index, (name, offset)) in catalog.iter().enumerate() {
            let end = catalog
                .get(index + 1)
                .map(|(_, next)| *next as u64)
                .unwrap_or(file_len);
            let size = end.checked_sub(*offset as u64).ok_or_else(|| {
                invalid_data(format!(
                    "{} in {} starts after its successor",
                    name,
                    path.display()
                ))
            })?;

            entries.push(MediaEntry {
                name: name.clone(),
                offset: *offset,
                size: size as u32,
            });
        }

        Ok(Self {
            inner: MediaArchive::new(path, entries, file, file_len)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.inner.entries
    }

    pub fn entry(&self, name: &str) -> Option<&MediaEntry> {
        self.inner.entry(name)
    }

    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.inner.read_file(name)
    }
}
