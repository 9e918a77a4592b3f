use std::collections::BTreeMap;

use lodrust_files_derive_parseable::Parse;

use crate::ParserError;
use crate::common::types::{Color, Palette, Point};
use crate::def::reader::DefReader;

pub const DEF_FRAME_HEADER_SIZE: usize = 32;
pub const DEF_FRAME_NAME_SIZE: usize = 13;

/// Sheets with this tag (buttons, buildings) have no shadow or selection colors.
pub const FORMAT_TAG_WITHOUT_SHADOWS: u32 = 71;

/// The first eight palette entries are not colors but transparency levels.
pub const SHADOW_PALETTE: [Color; 8] = [
    Color::rgba(0, 0, 0, 0),   // fully transparent
    Color::rgba(0, 0, 0, 192), // shadow border
    Color::rgba(0, 0, 0, 128),
    Color::rgba(0, 0, 0, 128),
    Color::rgba(0, 0, 0, 128), // shadow body
    Color::rgba(0, 0, 0, 0),   // selection highlight
    Color::rgba(0, 0, 0, 128), // shadow body below selection
    Color::rgba(0, 0, 0, 192), // shadow border below selection
];

#[derive(Debug, Copy, Clone, Parse)]
pub struct DefHeader {
    pub format_tag: u32,
    pub width: u32,
    pub height: u32,
    pub block_count: u32,
}

#[derive(Debug, Copy, Clone, Parse)]
pub struct BlockHeader {
    pub group: u32,
    pub entry_count: u32,
    pub unknown: [u8; 8],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Parse)]
pub struct FrameHeader {
    pub size: u32,
    pub format: u32,
    /// including margins
    pub full_width: u32,
    pub full_height: u32,
    /// of the pixel data, margins excluded
    pub width: u32,
    pub height: u32,
    pub left_margin: i32,
    pub top_margin: i32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    /// row-major palette indices
    Uncompressed,
    /// u32 offset per row, segments of (color or 0xFF, length - 1, raw bytes if 0xFF)
    Segments,
    /// one u16 offset for the first row, packed segments
    PackedSegments,
    /// u16 offset per 32 pixel block, packed segments
    PackedSegmentsRowTable,
}

impl TryFrom<u32> for PixelFormat {
    type Error = ParserError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PixelFormat::Uncompressed),
            1 => Ok(PixelFormat::Segments),
            2 => Ok(PixelFormat::PackedSegments),
            3 => Ok(PixelFormat::PackedSegmentsRowTable),
            format => Err(ParserError::UnsupportedPixelFormat { format }),
        }
    }
}

/// Receives the decoded scanlines of one frame. Implementations decide about the storage (flat
/// bitmap or run-length blocks), the parser only knows about the file format.
pub trait FrameSink {
    fn init(&mut self, content_size: Point, margins: Point, full_size: Point, palette: &Palette);

    /// Copies palette indices verbatim.
    fn load_raw(&mut self, data: &[u8]);

    /// Repeats one palette index `count` times.
    fn load_fill(&mut self, count: usize, color: u8);

    fn end_line(&mut self);
}

/// A parsed sprite sheet. It only holds the offset table and palette and borrows the pixel data,
/// frames are decoded on demand.
#[derive(Debug, Clone)]
pub struct DefContainer<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) format_tag: u32,
    pub(crate) palette: Palette,
    /// offsets[group][frame]
    pub(crate) offsets: BTreeMap<u32, Vec<u32>>,
}

impl<'a> DefContainer<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ParserError> {
        DefReader::parse(data)
    }

    pub fn format_tag(&self) -> u32 {
        self.format_tag
    }

    pub fn has_shadow_convention(&self) -> bool {
        self.format_tag != FORMAT_TAG_WITHOUT_SHADOWS
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// group -> frame count
    pub fn entries(&self) -> BTreeMap<u32, u32> {
        self.offsets
            .iter()
            .map(|(group, frames)| (*group, frames.len() as u32))
            .collect()
    }

    pub fn offset(&self, group: u32, frame: u32) -> Result<u32, ParserError> {
        self.offsets
            .get(&group)
            .and_then(|frames| frames.get(frame as usize))
            .copied()
            .ok_or(ParserError::FrameNotFound { group, frame })
    }

    pub fn frame_header(&self, group: u32, frame: u32) -> Result<FrameHeader, ParserError> {
        DefReader::read_frame_header(self.data, self.offset(group, frame)? as usize)
    }

    pub fn decode_frame<S: FrameSink>(&self, group: u32, frame: u32, sink: &mut S) -> Result<(), ParserError> {
        DefReader::decode_frame(self, group, frame, sink)
    }
}
