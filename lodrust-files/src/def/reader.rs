use std::collections::BTreeMap;

use crate::ParserError;
use crate::common::reader::Parseable;
use crate::common::stream::ByteStream;
use crate::common::types::{Color, PALETTE_SIZE, Palette, Point, Rgb};
use crate::def::types::{
    BlockHeader, DEF_FRAME_HEADER_SIZE, DEF_FRAME_NAME_SIZE, DefContainer, DefHeader, FORMAT_TAG_WITHOUT_SHADOWS,
    FrameHeader, FrameSink, PixelFormat, SHADOW_PALETTE,
};

/// Frames larger than this in either direction are treated as garbage rather than allocated.
const MAX_FRAME_DIMENSION: u32 = 0x4000;

pub struct DefReader {}

impl DefReader {
    pub fn parse(data: &[u8]) -> Result<DefContainer<'_>, ParserError> {
        let mut rdr = ByteStream::new(data);
        let header = DefHeader::parse(&mut rdr)?;

        let mut colors = [Color::TRANSPARENT; PALETTE_SIZE];
        for color in colors.iter_mut() {
            *color = Rgb::parse(&mut rdr)?.into();
        }

        if header.format_tag == FORMAT_TAG_WITHOUT_SHADOWS {
            colors[..SHADOW_PALETTE.len()].fill(Color::TRANSPARENT);
        } else {
            colors[..SHADOW_PALETTE.len()].copy_from_slice(&SHADOW_PALETTE);
        }

        let mut offsets: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for _ in 0..header.block_count {
            let block = BlockHeader::parse(&mut rdr)?;
            // the frame names are never used
            rdr.advance(DEF_FRAME_NAME_SIZE * block.entry_count as usize)?;

            let frames = offsets.entry(block.group).or_default();
            for _ in 0..block.entry_count {
                frames.push(rdr.read_u32()?);
            }
        }

        Ok(DefContainer {
            data,
            format_tag: header.format_tag,
            palette: Palette::new(colors),
            offsets,
        })
    }

    pub(crate) fn read_frame_header(data: &[u8], offset: usize) -> Result<FrameHeader, ParserError> {
        let mut rdr = ByteStream::new(data);
        rdr.seek(offset)?;
        FrameHeader::parse(&mut rdr)
    }

    pub fn decode_frame<S: FrameSink>(
        container: &DefContainer,
        group: u32,
        frame: u32,
        sink: &mut S,
    ) -> Result<(), ParserError> {
        let offset = container.offset(group, frame)? as usize;
        let header = Self::read_frame_header(container.data, offset)?;
        let format = PixelFormat::try_from(header.format)?;

        if header.width > MAX_FRAME_DIMENSION || header.height > MAX_FRAME_DIMENSION {
            return Err(ParserError::FormatError {
                reason: "Frame dimensions out of range",
            });
        }

        if header.full_width > MAX_FRAME_DIMENSION
            || header.full_height > MAX_FRAME_DIMENSION
            || header.left_margin.unsigned_abs() > MAX_FRAME_DIMENSION
            || header.top_margin.unsigned_abs() > MAX_FRAME_DIMENSION
        {
            return Err(ParserError::FormatError {
                reason: "Frame placement out of range",
            });
        }

        sink.init(
            Point::new(header.width as i32, header.height as i32),
            Point::new(header.left_margin, header.top_margin),
            Point::new(header.full_width as i32, header.full_height as i32),
            &container.palette,
        );

        let base = offset + DEF_FRAME_HEADER_SIZE;
        let mut rdr = ByteStream::new(container.data);
        rdr.seek(base)?;

        match format {
            PixelFormat::Uncompressed => {
                for _ in 0..header.height {
                    sink.load_raw(rdr.read_bytes(header.width as usize)?);
                    sink.end_line();
                }
            }
            PixelFormat::Segments => {
                let mut row_offsets = Vec::with_capacity(header.height as usize);
                for _ in 0..header.height {
                    row_offsets.push(rdr.read_u32()? as usize);
                }

                for (row, row_offset) in row_offsets.into_iter().enumerate() {
                    rdr.seek(base + row_offset)?;
                    Self::decode_segment_row(&mut rdr, row as u32, header.width, sink)?;
                    sink.end_line();
                }
            }
            PixelFormat::PackedSegments => {
                let first_row = rdr.read_u16()? as usize;
                rdr.seek(base + first_row)?;

                for row in 0..header.height {
                    Self::decode_packed_row(&mut rdr, row, header.width, sink)?;
                    sink.end_line();
                }
            }
            PixelFormat::PackedSegmentsRowTable => {
                let blocks_per_row = (header.width / 32) as usize;
                for row in 0..header.height {
                    rdr.seek(base + row as usize * 2 * blocks_per_row)?;
                    let row_offset = rdr.read_u16()? as usize;
                    rdr.seek(base + row_offset)?;
                    Self::decode_packed_row(&mut rdr, row, header.width, sink)?;
                    sink.end_line();
                }
            }
        }

        Ok(())
    }

    fn check_row(row: u32, decoded: u32, length: u32, width: u32) -> Result<(), ParserError> {
        if decoded + length > width {
            return Err(ParserError::RowLengthMismatch {
                row,
                decoded: decoded + length,
                expected: width,
            });
        }
        Ok(())
    }

    fn decode_segment_row<S: FrameSink>(
        rdr: &mut ByteStream,
        row: u32,
        width: u32,
        sink: &mut S,
    ) -> Result<(), ParserError> {
        let mut decoded = 0u32;
        while decoded < width {
            let kind = rdr.read_u8()?;
            let length = rdr.read_u8()? as u32 + 1;
            Self::check_row(row, decoded, length, width)?;

            if kind == 0xFF {
                sink.load_raw(rdr.read_bytes(length as usize)?);
            } else {
                sink.load_fill(length as usize, kind);
            }
            decoded += length;
        }
        Ok(())
    }

    fn decode_packed_row<S: FrameSink>(
        rdr: &mut ByteStream,
        row: u32,
        width: u32,
        sink: &mut S,
    ) -> Result<(), ParserError> {
        let mut decoded = 0u32;
        while decoded < width {
            let segment = rdr.read_u8()?;
            let code = segment >> 5;
            let length = (segment & 0x1F) as u32 + 1;
            Self::check_row(row, decoded, length, width)?;

            if code == 7 {
                sink.load_raw(rdr.read_bytes(length as usize)?);
            } else {
                sink.load_fill(length as usize, code);
            }
            decoded += length;
        }
        Ok(())
    }
}
