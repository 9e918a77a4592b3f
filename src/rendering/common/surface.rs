use lodrust_files::common::types::Color;

use crate::io::error::ResourceError;
use crate::rendering::common::types::Rect;

/// A mutable view into a renderer owned pixel buffer. Supported layouts are 2 bytes per pixel
/// (RGB565), 3 (BGR) and 4 (BGRA), rows are `pitch` bytes apart.
pub struct Surface<'a> {
    width: u32,
    height: u32,
    bytes_per_pixel: u8,
    pitch: usize,
    pixels: &'a mut [u8],
}

impl<'a> Surface<'a> {
    pub fn new(
        width: u32,
        height: u32,
        bytes_per_pixel: u8,
        pitch: usize,
        pixels: &'a mut [u8],
    ) -> Result<Self, ResourceError> {
        if !(2..=4).contains(&bytes_per_pixel) {
            return Err(ResourceError::PreconditionViolated(format!(
                "unsupported surface format with {} bytes per pixel",
                bytes_per_pixel
            )));
        }
        if pitch < width as usize * bytes_per_pixel as usize || pixels.len() < pitch * height as usize {
            return Err(ResourceError::PreconditionViolated(format!(
                "surface buffer of {} bytes is too small for {}x{} at pitch {}",
                pixels.len(),
                width,
                height,
                pitch
            )));
        }

        Ok(Self {
            width,
            height,
            bytes_per_pixel,
            pitch,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.bytes_per_pixel
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        Some(y as usize * self.pitch + x as usize * self.bytes_per_pixel as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        let offset = self.offset(x, y)?;
        let px = &self.pixels[offset..offset + self.bytes_per_pixel as usize];
        Some(match self.bytes_per_pixel {
            2 => {
                let value = u16::from_le_bytes([px[0], px[1]]);
                let r = ((value >> 11) & 0x1F) as u8;
                let g = ((value >> 5) & 0x3F) as u8;
                let b = (value & 0x1F) as u8;
                Color::opaque((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
            }
            3 => Color::opaque(px[2], px[1], px[0]),
            _ => Color::rgba(px[2], px[1], px[0], px[3]),
        })
    }

    fn write(&mut self, offset: usize, color: Color) {
        let px = &mut self.pixels[offset..offset + self.bytes_per_pixel as usize];
        match px.len() {
            2 => {
                let value = ((color.r as u16 >> 3) << 11) | ((color.g as u16 >> 2) << 5) | (color.b as u16 >> 3);
                px.copy_from_slice(&value.to_le_bytes());
            }
            3 => px.copy_from_slice(&[color.b, color.g, color.r]),
            _ => px.copy_from_slice(&[color.b, color.g, color.r, color.a]),
        }
    }

    /// Writes `color` at (x, y), alpha blended over the current content. Fully transparent colors
    /// and positions outside of the surface are ignored.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if color.is_transparent() {
            return;
        }
        let Some(offset) = self.offset(x, y) else {
            return;
        };

        if color.is_opaque() {
            self.write(offset, color);
            return;
        }

        let Some(dst) = self.get(x, y) else {
            return;
        };
        self.write(offset, blend(color, dst));
    }

    /// `put` for `count` pixels to the right of (x, y).
    pub fn put_row(&mut self, x: i32, y: i32, count: i32, color: Color) {
        for i in 0..count {
            self.put(x + i, y, color);
        }
    }
}

fn blend(src: Color, dst: Color) -> Color {
    let a = src.a as u32;
    let inv = 255 - a;
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv) / 255) as u8;
    Color::rgba(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (a + dst.a as u32 * inv / 255) as u8,
    )
}
