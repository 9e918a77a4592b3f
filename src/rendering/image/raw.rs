use lodrust_files::common::types::{Palette, Point};
use lodrust_files::def::types::FrameSink;

use crate::rendering::image::{PixelStorage, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFormat {
    /// one palette index per pixel
    Indexed(Vec<u8>),
    /// four bytes per pixel, R G B A
    Rgba(Vec<u8>),
}

/// A flat bitmap of the content rectangle, for editing and export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPixels {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: RawFormat,
}

impl RawPixels {
    pub fn indexed(width: u32, height: u32, indices: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: RawFormat::Indexed(indices),
        }
    }

    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: RawFormat::Rgba(data),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> &RawFormat {
        &self.format
    }

    pub(crate) fn row(&self, row: usize) -> Option<Span<'_>> {
        let width = self.width as usize;
        match &self.format {
            RawFormat::Indexed(indices) => indices.get(row * width..(row + 1) * width).map(Span::Indices),
            RawFormat::Rgba(data) => data.get(row * width * 4..(row + 1) * width * 4).map(Span::Rgba),
        }
    }
}

#[derive(Default)]
pub struct RawPixelSink {
    palette: Palette,
    content_size: Point,
    margins: Point,
    full_size: Point,
    indices: Vec<u8>,
}

impl RawPixelSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_parts(self) -> (PixelStorage, Palette, Point, Point) {
        let pixels = RawPixels::indexed(
            self.content_size.x.max(0) as u32,
            self.content_size.y.max(0) as u32,
            self.indices,
        );
        (
            PixelStorage::Raw(pixels),
            self.palette,
            self.margins,
            self.full_size,
        )
    }
}

impl FrameSink for RawPixelSink {
    fn init(&mut self, content_size: Point, margins: Point, full_size: Point, palette: &Palette) {
        self.content_size = content_size;
        self.margins = margins;
        self.full_size = full_size;
        self.palette = palette.clone();
        self.indices = Vec::with_capacity(content_size.x.max(0) as usize * content_size.y.max(0) as usize);
    }

    fn load_raw(&mut self, data: &[u8]) {
        self.indices.extend_from_slice(data);
    }

    fn load_fill(&mut self, count: usize, color: u8) {
        self.indices.resize(self.indices.len() + count, color);
    }

    fn end_line(&mut self) {}
}
