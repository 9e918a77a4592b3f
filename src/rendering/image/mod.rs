//! Decoded images. A [`DecodedSprite`] is immutable pixel data plus a palette and rendering state
//! (alpha, flip) that may be changed by its sole owner; shared sprites are transformed through the
//! resource cache, which clones them first.

use lodrust_files::common::types::{Color, Palette, Point};

use crate::rendering::asset_graph::locator::GraphicsLocator;
use crate::rendering::common::surface::Surface;
use crate::rendering::common::types::Rect;
use crate::rendering::image::compact::{CompactPixels, CompactRow};
use crate::rendering::image::effects::{
    Flip, GLOW_INDICES, GlowKind, PLAYER_BAND_START, PlayerPalettes, glow_color,
};
use crate::rendering::image::raw::RawPixels;

pub mod compact;
pub mod effects;
pub mod raw;


/// Which sink to decode DEF frames into.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum StorageKind {
    #[default]
    Compact,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelStorage {
    Compact(CompactPixels),
    Raw(RawPixels),
}

/// A horizontal run of pixels within one row of the content rectangle.
pub(crate) enum Span<'a> {
    Fill { count: usize, index: u8 },
    Indices(&'a [u8]),
    Rgba(&'a [u8]),
}

impl Span<'_> {
    fn len(&self) -> usize {
        match self {
            Span::Fill { count, .. } => *count,
            Span::Indices(indices) => indices.len(),
            Span::Rgba(data) => data.len() / 4,
        }
    }
}

pub(crate) enum RowSpans<'a> {
    Compact(CompactRow<'a>),
    Raw(Option<Span<'a>>),
}

impl<'a> Iterator for RowSpans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowSpans::Compact(row) => row.next(),
            RowSpans::Raw(span) => span.take(),
        }
    }
}

impl PixelStorage {
    pub fn content_size(&self) -> Point {
        match self {
            PixelStorage::Compact(pixels) => Point::new(pixels.width() as i32, pixels.height() as i32),
            PixelStorage::Raw(pixels) => Point::new(pixels.width() as i32, pixels.height() as i32),
        }
    }

    pub(crate) fn row_spans(&self, row: usize) -> RowSpans<'_> {
        match self {
            PixelStorage::Compact(pixels) => RowSpans::Compact(pixels.row(row)),
            PixelStorage::Raw(pixels) => RowSpans::Raw(pixels.row(row)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecodedSprite {
    storage: PixelStorage,
    palette: Palette,
    /// palette entries 5, 6, 7 as decoded, the glow overlay is blended from these
    glow_base: [Color; 3],
    /// position of the content rectangle inside the full frame
    margins: Point,
    full_size: Point,
    alpha: u8,
    flip: Flip,
    shadow_convention: bool,
    locator: Option<GraphicsLocator>,
}

impl DecodedSprite {
    pub fn new(
        storage: PixelStorage,
        palette: Palette,
        margins: Point,
        full_size: Point,
        shadow_convention: bool,
    ) -> Self {
        let glow_base = GLOW_INDICES.map(|index| palette.get(index));
        Self {
            storage,
            palette,
            glow_base,
            margins,
            full_size,
            alpha: 255,
            flip: Flip::None,
            shadow_convention,
            locator: None,
        }
    }

    /// A bitmap without margins, e.g. from a PNG or PCX file.
    pub fn from_raw(pixels: RawPixels, palette: Palette) -> Self {
        let size = Point::new(pixels.width() as i32, pixels.height() as i32);
        Self::new(PixelStorage::Raw(pixels), palette, Point::default(), size, false)
    }

    /// Logical width, including the margins
    pub fn width(&self) -> u32 {
        self.full_size.x.max(0) as u32
    }

    pub fn height(&self) -> u32 {
        self.full_size.y.max(0) as u32
    }

    pub fn full_size(&self) -> Point {
        self.full_size
    }

    pub fn margins(&self) -> Point {
        self.margins
    }

    pub fn content_rect(&self) -> Rect {
        Rect::from_parts(self.margins, self.storage.content_size())
    }

    pub fn storage(&self) -> &PixelStorage {
        &self.storage
    }

    pub fn is_compact(&self) -> bool {
        matches!(self.storage, PixelStorage::Compact(_))
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn flip(&self) -> Flip {
        self.flip
    }

    pub fn has_shadow_convention(&self) -> bool {
        self.shadow_convention
    }

    pub fn locator(&self) -> Option<&GraphicsLocator> {
        self.locator.as_ref()
    }

    pub(crate) fn set_locator(&mut self, locator: GraphicsLocator) {
        self.locator = Some(locator);
    }

    /// Replaces the player band of the palette with the colors of `owner`, or the neutral colors
    /// for anything that isn't a player.
    pub fn recolor_to_owner(&mut self, owner: u8, palettes: &PlayerPalettes) {
        for (offset, color) in palettes.band(owner).iter().enumerate() {
            self.palette.colors[PLAYER_BAND_START + offset] = *color;
        }
    }

    /// Blends the selection slots of the palette towards the glow color. `GlowKind::None` restores
    /// them. Sheets without the shadow convention have no such slots and are left alone.
    pub fn set_glow(&mut self, kind: GlowKind, intensity: u8) {
        if !self.shadow_convention {
            return;
        }
        for (index, base) in GLOW_INDICES.iter().zip(self.glow_base) {
            self.palette.set(*index, glow_color(base, kind, intensity));
        }
    }

    /// Global opacity, 255 is opaque.
    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    pub fn set_flip(&mut self, flip: Flip) {
        self.flip = flip;
    }

    #[inline]
    fn apply_alpha(&self, color: Color) -> Color {
        if self.alpha == 255 {
            return color;
        }
        Color::rgba(
            color.r,
            color.g,
            color.b,
            (color.a as u32 * self.alpha as u32 / 255) as u8,
        )
    }

    #[inline]
    fn color_of(&self, index: u8) -> Color {
        self.apply_alpha(self.palette.get(index))
    }

    fn span_color(&self, span: &Span, i: usize) -> Color {
        match span {
            Span::Fill { index, .. } => self.color_of(*index),
            Span::Indices(indices) => self.color_of(indices[i]),
            Span::Rgba(data) => {
                let px = &data[i * 4..i * 4 + 4];
                self.apply_alpha(Color::rgba(px[0], px[1], px[2], px[3]))
            }
        }
    }

    /// Maps a column of the content rectangle to the x coordinate within the full frame.
    /// Saturates, so absurd margins land outside every surface instead of wrapping.
    #[inline]
    fn frame_x(&self, column: i32) -> i32 {
        let x = self.margins.x.saturating_add(column);
        if self.flip.horizontal() {
            self.full_size.x.saturating_sub(1).saturating_sub(x)
        } else {
            x
        }
    }

    #[inline]
    fn frame_y(&self, row: i32) -> i32 {
        let y = self.margins.y.saturating_add(row);
        if self.flip.vertical() {
            self.full_size.y.saturating_sub(1).saturating_sub(y)
        } else {
            y
        }
    }

    /// Blits the sprite with the top left corner of its full frame at (x, y). Only the part
    /// inside `clip` (in surface coordinates) and inside the surface is touched.
    pub fn draw(&self, surface: &mut Surface, x: i32, y: i32, clip: Option<Rect>) {
        let mut visible = surface.bounds();
        if let Some(clip) = clip {
            visible = visible.intersect(&clip);
        }
        if visible.is_empty() || self.alpha == 0 {
            return;
        }

        let content = self.storage.content_size();
        for row in 0..content.y {
            let dest_y = y.saturating_add(self.frame_y(row));
            if dest_y < visible.y || dest_y >= visible.bottom() {
                continue;
            }

            let mut column = 0i32;
            for span in self.storage.row_spans(row as usize) {
                let count = span.len() as i32;
                match span {
                    Span::Fill { index, .. } => {
                        let color = self.color_of(index);
                        if !color.is_transparent() {
                            let first = x.saturating_add(self.frame_x(column));
                            let last = x.saturating_add(self.frame_x(column.saturating_add(count - 1)));
                            let start = first.min(last).max(visible.x);
                            let end = first.max(last).saturating_add(1).min(visible.right());
                            if start < end {
                                surface.put_row(start, dest_y, end - start, color);
                            }
                        }
                    }
                    Span::Indices(indices) => {
                        for (i, index) in indices.iter().enumerate() {
                            let dest_x = x.saturating_add(self.frame_x(column.saturating_add(i as i32)));
                            if dest_x >= visible.x && dest_x < visible.right() {
                                surface.put(dest_x, dest_y, self.color_of(*index));
                            }
                        }
                    }
                    Span::Rgba(data) => {
                        for (i, px) in data.chunks_exact(4).enumerate() {
                            let dest_x = x.saturating_add(self.frame_x(column.saturating_add(i as i32)));
                            if dest_x >= visible.x && dest_x < visible.right() {
                                let color = self.apply_alpha(Color::rgba(px[0], px[1], px[2], px[3]));
                                surface.put(dest_x, dest_y, color);
                            }
                        }
                    }
                }
                column = column.saturating_add(count);
            }
        }
    }

    /// The full frame as tightly packed RGBA, with flip and alpha applied and the margins transparent.
    /// Empty if the frame is too large to allocate.
    pub fn to_rgba(&self) -> Vec<u8> {
        let (width, height) = (self.width() as usize, self.height() as usize);
        let mut out = Vec::new();
        let Some(len) = width.checked_mul(height).and_then(|area| area.checked_mul(4)) else {
            return out;
        };
        if out.try_reserve_exact(len).is_err() {
            return out;
        }
        out.resize(len, 0);

        let content = self.storage.content_size();
        for row in 0..content.y {
            let Ok(fy) = usize::try_from(self.frame_y(row)) else {
                continue;
            };
            if fy >= height {
                continue;
            }

            let mut column = 0i32;
            for span in self.storage.row_spans(row as usize) {
                let count = span.len();
                for i in 0..count {
                    let fx = self.frame_x(column.saturating_add(i as i32));
                    let Ok(fx) = usize::try_from(fx) else {
                        continue;
                    };
                    if fx >= width {
                        continue;
                    }
                    let color = self.span_color(&span, i);
                    let offset = (fy * width + fx) * 4;
                    out[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
                }
                column = column.saturating_add(count as i32);
            }
        }

        out
    }

    /// The color at (x, y) of the full frame, as [`DecodedSprite::to_rgba`] would export it.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }

        // undo the flip, then step from frame coordinates into the content rectangle
        let (mut fx, mut fy) = (x as i64, y as i64);
        if self.flip.horizontal() {
            fx = self.full_size.x as i64 - 1 - fx;
        }
        if self.flip.vertical() {
            fy = self.full_size.y as i64 - 1 - fy;
        }
        let column = fx - self.margins.x as i64;
        let row = fy - self.margins.y as i64;

        let content = self.storage.content_size();
        if column < 0 || row < 0 || column >= content.x as i64 || row >= content.y as i64 {
            return Some(Color::TRANSPARENT);
        }

        let mut start = 0usize;
        for span in self.storage.row_spans(row as usize) {
            let count = span.len();
            let i = column as usize - start;
            if i < count {
                return Some(self.span_color(&span, i));
            }
            start += count;
        }
        Some(Color::TRANSPARENT)
    }
}
