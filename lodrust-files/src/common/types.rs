use lodrust_files_derive_parseable::Parse;

pub const PALETTE_SIZE: usize = 256;

/// On-disk palette entry.
#[derive(Debug, Copy, Clone, Parse)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 255 = opaque, 0 = fully transparent
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Color::opaque(value.r, value.g, value.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub colors: [Color; PALETTE_SIZE],
}

impl Palette {
    pub fn new(colors: [Color; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    #[inline]
    pub fn get(&self, index: u8) -> Color {
        self.colors[index as usize]
    }

    #[inline]
    pub fn set(&mut self, index: u8, color: Color) {
        self.colors[index as usize] = color;
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [Color::TRANSPARENT; PALETTE_SIZE],
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
