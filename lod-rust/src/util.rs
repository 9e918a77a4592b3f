use std::fs::File;
use std::io::{Error, ErrorKind, Read, Result, Seek, SeekFrom};
use std::sync::Mutex;

/// Reads `len` bytes at `offset`. The handle is only locked for the seek and the read.
pub(crate) fn read_at(file: &Mutex<File>, offset: u64, len: usize) -> Result<Vec<u8>> {
    let mut guard = file
        .lock()
        .map_err(|_| Error::other("archive file lock poisoned"))?;
    guard.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    guard.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn name_from_bytes(buf: &[u8]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

pub(crate) fn not_found(name: &str) -> Error {
    Error::new(ErrorKind::NotFound, format!("{} is not part of the archive", name))
}

pub(crate) fn invalid_data(reason: String) -> Error {
    Error::new(ErrorKind::InvalidData, reason)
}
