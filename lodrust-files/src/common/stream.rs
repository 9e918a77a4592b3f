use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::ParserError;

/// Random-access cursor over an in-memory byte buffer. All integer reads are little-endian and
/// every access is bounds checked, since the buffers usually come straight out of an archive.
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn check(&self, position: usize, requested: usize) -> Result<(), ParserError> {
        match position.checked_add(requested) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(ParserError::OutOfBounds {
                position,
                requested,
                length: self.data.len(),
            }),
        }
    }

    /// Moves the cursor to `pos`. Seeking to exactly the end is allowed, beyond is not.
    pub fn seek(&mut self, pos: usize) -> Result<(), ParserError> {
        self.check(pos, 0)?;
        self.pos = pos;
        Ok(())
    }

    pub fn advance(&mut self, n: usize) -> Result<(), ParserError> {
        self.check(self.pos, n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ParserError> {
        self.check(self.pos, n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParserError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ParserError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParserError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, ParserError> {
        Ok(self.read_u32()? as i32)
    }

    /// Borrowed view of everything from `pos` to the end of the buffer.
    pub fn slice_from(&self, pos: usize) -> Result<&'a [u8], ParserError> {
        self.check(pos, 0)?;
        Ok(&self.data[pos..])
    }

    pub fn slice(&self, pos: usize, len: usize) -> Result<&'a [u8], ParserError> {
        self.check(pos, len)?;
        Ok(&self.data[pos..pos + len])
    }
}

impl Read for ByteStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for ByteStream<'_> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset as i64),
            SeekFrom::End(offset) => (self.data.len() as i64).checked_add(offset),
            SeekFrom::Current(offset) => (self.pos as i64).checked_add(offset),
        };

        match target {
            Some(target) if target >= 0 && target as usize <= self.data.len() => {
                self.pos = target as usize;
                Ok(self.pos as u64)
            }
            _ => Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                "seek outside of the stream",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::reader::Parseable;

    #[test]
    fn reads_little_endian() -> Result<(), anyhow::Error> {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut stream = ByteStream::new(&data);
        assert_eq!(stream.read_u8()?, 0x01);
        assert_eq!(stream.read_u16()?, 0x1234);
        assert_eq!(stream.read_u32()?, 0x12345678);
        assert_eq!(stream.remaining(), 0);
        Ok(())
    }

    #[test]
    fn read_past_end_is_an_error() {
        let data = [0u8; 3];
        let mut stream = ByteStream::new(&data);
        stream.advance(2).unwrap();
        assert!(matches!(
            stream.read_u16(),
            Err(ParserError::OutOfBounds {
                position: 2,
                requested: 2,
                length: 3
            })
        ));
        // the failed read must not move the cursor
        assert_eq!(stream.position(), 2);
    }

    #[test]
    fn seek_and_slices() {
        let data = [1u8, 2, 3, 4];
        let mut stream = ByteStream::new(&data);
        assert!(stream.seek(4).is_ok());
        assert!(stream.seek(5).is_err());
        assert_eq!(stream.slice_from(2).unwrap(), &[3, 4]);
        assert_eq!(stream.slice_from(4).unwrap(), &[] as &[u8]);
        assert!(stream.slice(3, 2).is_err());
        assert!(stream.advance(1).is_err());
    }

    #[test]
    fn parseable_through_read_impl() {
        let data = 0xCAFEu32.to_le_bytes();
        let mut stream = ByteStream::new(&data);
        assert_eq!(u32::parse(&mut stream).unwrap(), 0xCAFE);
        assert!(u32::parse(&mut stream).is_err());
    }
}
