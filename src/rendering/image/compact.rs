use lodrust_files::common::types::{Palette, Point};
use lodrust_files::def::types::FrameSink;

use crate::rendering::image::{PixelStorage, Span};

/// Segment marker for raw runs, any other value is the palette index of a fill run.
pub const RAW_SEGMENT: u8 = 0xFF;
const MAX_SEGMENT_LENGTH: usize = 255;

/// Run-length encoded 8 bit pixels, optimized for masked blitting. Each row is a list of
/// segments, either `(RAW_SEGMENT, length, indices...)` or `(index, length)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactPixels {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
    /// start of every row in `data`, plus the end of the last one
    pub(crate) lines: Vec<usize>,
}

impl CompactPixels {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn row(&self, row: usize) -> CompactRow<'_> {
        let data = match (self.lines.get(row), self.lines.get(row + 1)) {
            (Some(&start), Some(&end)) => self.data.get(start..end).unwrap_or(&[]),
            _ => &[],
        };
        CompactRow { data }
    }
}

pub(crate) struct CompactRow<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for CompactRow<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&kind, &length) = (self.data.first()?, self.data.get(1)?);
        let length = length as usize;
        if kind == RAW_SEGMENT {
            let indices = self.data.get(2..2 + length)?;
            self.data = &self.data[2 + length..];
            Some(Span::Indices(indices))
        } else {
            self.data = &self.data[2..];
            Some(Span::Fill {
                count: length,
                index: kind,
            })
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PixelClass {
    Transparent,
    Translucent,
    Opaque,
}

/// Builds [`CompactPixels`] from the decoded scanlines. Repeated colors and transparent pixels
/// become fill segments, everything else is grouped into raw segments that never mix opaque and
/// translucent colors, so the blitter can pick one strategy per segment.
pub struct CompactRunSink {
    palette: Palette,
    content_size: Point,
    margins: Point,
    full_size: Point,
    data: Vec<u8>,
    lines: Vec<usize>,
    /// header position of the last segment of the current row
    entry: Option<usize>,
}

impl Default for CompactRunSink {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            content_size: Point::default(),
            margins: Point::default(),
            full_size: Point::default(),
            data: Vec::new(),
            lines: vec![0],
            entry: None,
        }
    }
}

impl CompactRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_parts(self) -> (PixelStorage, Palette, Point, Point) {
        let pixels = CompactPixels {
            width: self.content_size.x.max(0) as u32,
            height: self.content_size.y.max(0) as u32,
            data: self.data,
            lines: self.lines,
        };
        (
            PixelStorage::Compact(pixels),
            self.palette,
            self.margins,
            self.full_size,
        )
    }

    fn class_of(&self, index: u8) -> PixelClass {
        let color = self.palette.get(index);
        if index == 0 || color.is_transparent() {
            PixelClass::Transparent
        } else if color.is_opaque() {
            PixelClass::Opaque
        } else {
            PixelClass::Translucent
        }
    }

    /// Header position and length of the current row's last segment, if it is of `kind`
    fn last_segment(&self, kind: u8) -> Option<(usize, usize)> {
        self.entry
            .filter(|&entry| self.data[entry] == kind)
            .map(|entry| (entry, self.data[entry + 1] as usize))
    }

    fn push_raw(&mut self, mut data: &[u8]) {
        let Some(&first) = data.first() else {
            return;
        };

        // extend the previous raw segment, if it holds the same kind of pixels
        let previous = self
            .last_segment(RAW_SEGMENT)
            .filter(|&(entry, _)| self.class_of(self.data[entry + 2]) == self.class_of(first));
        if let Some((entry, length)) = previous {
            let count = data.len().min(MAX_SEGMENT_LENGTH - length);
            self.data[entry + 1] = (length + count) as u8;
            self.data.extend_from_slice(&data[..count]);
            data = &data[count..];
        }

        for chunk in data.chunks(MAX_SEGMENT_LENGTH) {
            self.entry = Some(self.data.len());
            self.data.push(RAW_SEGMENT);
            self.data.push(chunk.len() as u8);
            self.data.extend_from_slice(chunk);
        }
    }
}

impl FrameSink for CompactRunSink {
    fn init(&mut self, content_size: Point, margins: Point, full_size: Point, palette: &Palette) {
        self.content_size = content_size;
        self.margins = margins;
        self.full_size = full_size;
        self.palette = palette.clone();
        self.data = Vec::with_capacity(content_size.x.max(0) as usize * content_size.y.max(0) as usize);
        self.lines = Vec::with_capacity(content_size.y.max(0) as usize + 1);
        self.lines.push(0);
        self.entry = None;
    }

    fn load_raw(&mut self, mut data: &[u8]) {
        while let Some(&color) = data.first() {
            let run = data.iter().take_while(|&&c| c == color).count();
            if color != RAW_SEGMENT && (run > 1 || self.class_of(color) == PixelClass::Transparent) {
                self.load_fill(run, color);
                data = &data[run..];
                continue;
            }

            // raw until the class changes or a fill run starts
            let class = self.class_of(color);
            let mut length = 1;
            while let Some(&next) = data.get(length) {
                let starts_fill = next != RAW_SEGMENT
                    && (data.get(length + 1) == Some(&next) || self.class_of(next) == PixelClass::Transparent);
                if self.class_of(next) != class || starts_fill {
                    break;
                }
                length += 1;
            }

            self.push_raw(&data[..length]);
            data = &data[length..];
        }
    }

    fn load_fill(&mut self, mut count: usize, color: u8) {
        if count == 0 {
            return;
        }
        if color == RAW_SEGMENT {
            self.push_raw(&vec![RAW_SEGMENT; count]);
            return;
        }

        if let Some((entry, length)) = self.last_segment(color) {
            let extra = count.min(MAX_SEGMENT_LENGTH - length);
            self.data[entry + 1] = (length + extra) as u8;
            count -= extra;
        }

        while count > 0 {
            let length = count.min(MAX_SEGMENT_LENGTH);
            self.entry = Some(self.data.len());
            self.data.push(color);
            self.data.push(length as u8);
            count -= length;
        }
    }

    fn end_line(&mut self) {
        self.lines.push(self.data.len());
        self.entry = None;
    }
}
