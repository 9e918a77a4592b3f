use itertools::Itertools;
use log::debug;
use lodrust_files::common::types::Palette;
use lodrust_files::pcx::reader::PcxReader;
use lodrust_files::pcx::types::PcxPixels;

use crate::io::error::ResourceError;
use crate::rendering::image::DecodedSprite;
use crate::rendering::image::raw::RawPixels;

/// Single images: the game's own PCX bitmaps and the common formats mods ship instead.
pub struct BitmapLoader {}

impl BitmapLoader {
    /// `extension` is the uppercase extension of the entry including the dot, it decides about
    /// the decoder.
    pub fn decode(name: &str, data: &[u8], extension: &str) -> Result<DecodedSprite, ResourceError> {
        match extension {
            ".PCX" => Self::decode_pcx(name, data),
            ".PNG" | ".BMP" | ".TGA" | ".JPG" => Self::decode_generic(name, data),
            _ => Err(ResourceError::corrupt(
                name,
                format!("{} is not a bitmap format", extension),
            )),
        }
    }

    fn decode_pcx(name: &str, data: &[u8]) -> Result<DecodedSprite, ResourceError> {
        let pcx = PcxReader::parse(data).map_err(|e| ResourceError::from_parser(name, e))?;
        debug!("Decoded PCX {} ({}x{})", name, pcx.width, pcx.height);

        Ok(match pcx.pixels {
            PcxPixels::Indexed { indices, palette } => {
                DecodedSprite::from_raw(RawPixels::indexed(pcx.width, pcx.height, indices), palette)
            }
            PcxPixels::Bgr(bgr) => {
                let rgba = bgr
                    .chunks_exact(3)
                    .flat_map(|px| [px[2], px[1], px[0], 255])
                    .collect_vec();
                DecodedSprite::from_raw(RawPixels::rgba(pcx.width, pcx.height, rgba), Palette::default())
            }
        })
    }

    fn decode_generic(name: &str, data: &[u8]) -> Result<DecodedSprite, ResourceError> {
        let image = ::image::load_from_memory(data).map_err(|e| ResourceError::corrupt(name, e))?;
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        debug!("Decoded {} ({}x{})", name, width, height);

        Ok(DecodedSprite::from_raw(
            RawPixels::rgba(width, height, rgba.into_raw()),
            Palette::default(),
        ))
    }
}
