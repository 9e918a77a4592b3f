use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Result, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::compression::inflate_exact;
use crate::util::{invalid_data, name_from_bytes, not_found, read_at};

const LOD_ENTRY_COUNT_OFFSET: u64 = 8;
const LOD_DIRECTORY_OFFSET: u64 = 0x5C;
const LOD_ENTRY_NAME_SIZE: usize = 16;
const LOD_ENTRY_SIZE: u64 = LOD_ENTRY_NAME_SIZE as u64 + 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LodEntry {
    /// As stored in the catalog, e.g. `AVWANGL.DEF`
    pub name: String,
    pub offset: u32,
    pub uncompressed_size: u32,
    /// 0 means the entry is stored without compression
    pub compressed_size: u32,
}

impl LodEntry {
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.compressed_size > 0
    }

    #[inline]
    pub fn stored_size(&self) -> u32 {
        if self.is_compressed() {
            self.compressed_size
        } else {
            self.uncompressed_size
        }
    }
}

/// The compressed container the game ships most of its assets in. The catalog is read once when
/// opening; the file handle stays open for subsequent reads.
pub struct LodArchive {
    path: PathBuf,
    entries: Vec<LodEntry>,
    /// uppercase name -> index into entries
    lookup: HashMap<String, usize>,
    file: Mutex<File>,
}

impl LodArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let file_len = file.metadata()?.len();

        if file_len < LOD_DIRECTORY_OFFSET {
            return Err(invalid_data(format!(
                "{} is too short to be a LOD archive",
                path.display()
            )));
        }

        file.seek(SeekFrom::Start(LOD_ENTRY_COUNT_OFFSET))?;
        let count = file.read_u32::<LittleEndian>()? as u64;
        if LOD_DIRECTORY_OFFSET + count * LOD_ENTRY_SIZE > file_len {
            return Err(invalid_data(format!(
                "{} declares {} entries, which exceed the file",
                path.display(),
                count
            )));
        }

        file.seek(SeekFrom::Start(LOD_DIRECTORY_OFFSET))?;
        let mut entries = Vec::with_capacity(count as usize);
        let mut lookup = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let mut name = [0u8; LOD_ENTRY_NAME_SIZE];
            file.read_exact(&mut name)?;
            let offset = file.read_u32::<LittleEndian>()?;
            let uncompressed_size = file.read_u32::<LittleEndian>()?;
            let _unused = file.read_u32::<LittleEndian>()?;
            let compressed_size = file.read_u32::<LittleEndian>()?;
            let entry = LodEntry {
                name: name_from_bytes(&name),
                offset,
                uncompressed_size,
                compressed_size,
            };

            if entry.offset as u64 + entry.stored_size() as u64 > file_len {
                return Err(invalid_data(format!(
                    "{} in {} points outside of the archive",
                    entry.name,
                    path.display()
                )));
            }

            lookup.insert(entry.name.to_ascii_uppercase(), entries.len());
            entries.push(entry);
        }

        Ok(LodArchive {
            path,
            entries,
            lookup,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// In catalog order.
    pub fn entries(&self) -> &[LodEntry] {
        &self.entries
    }

    /// Case-insensitive.
    pub fn entry(&self, name: &str) -> Option<&LodEntry> {
        self.lookup
            .get(&name.to_ascii_uppercase())
            .map(|index| &self.entries[*index])
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Reads and, if needed, inflates an entry. Compressed entries have to inflate to exactly the
    /// declared size.
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.entry(name).ok_or_else(|| not_found(name))?;
        let raw = read_at(
            &self.file,
            entry.offset as u64,
            entry.stored_size() as usize,
        )?;

        if entry.is_compressed() {
            inflate_exact(&raw, entry.uncompressed_size as usize)
        } else {
            Ok(raw)
        }
    }
}
