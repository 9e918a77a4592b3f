use std::io::{Error, ErrorKind, Read, Result};

use flate2::read::{MultiGzDecoder, ZlibDecoder};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Inflates a zlib stream that is known to decompress to exactly `expected` bytes. Anything else,
/// be it a truncated or corrupt stream or surplus data, is reported as `InvalidData`; partial
/// output is never returned.
pub fn inflate_exact(input: &[u8], expected: usize) -> Result<Vec<u8>> {
    // the expected size comes from an untrusted catalog
    let mut out = Vec::with_capacity(expected.min(1 << 24));
    ZlibDecoder::new(input)
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    if out.len() != expected {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "decompressed to {} bytes, expected {}",
                out.len(),
                expected
            ),
        ));
    }

    Ok(out)
}

/// Unpacks a gzip file, e.g. a map. Input without the gzip magic is returned unchanged, since
/// the game reads uncompressed maps through the same path.
pub fn gunzip(input: &[u8]) -> Result<Vec<u8>> {
    if !input.starts_with(&GZIP_MAGIC) {
        return Ok(input.to_vec());
    }

    let mut out = Vec::new();
    MultiGzDecoder::new(input)
        .read_to_end(&mut out)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
    Ok(out)
}
