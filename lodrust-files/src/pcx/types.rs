use crate::common::types::Palette;

#[derive(Debug, Clone)]
pub enum PcxPixels {
    /// One palette index per pixel, index 0 is transparent.
    Indexed { indices: Vec<u8>, palette: Palette },
    /// Three bytes per pixel in B, G, R order.
    Bgr(Vec<u8>),
}

/// The flat bitmaps stored inside the game archives. Despite the extension, this is not ZSoft PCX.
#[derive(Debug, Clone)]
pub struct PcxImage {
    pub width: u32,
    pub height: u32,
    pub pixels: PcxPixels,
}
