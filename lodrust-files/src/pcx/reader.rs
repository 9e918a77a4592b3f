use crate::ParserError;
use crate::common::reader::Parseable;
use crate::common::stream::ByteStream;
use crate::common::types::{Color, PALETTE_SIZE, Palette, Rgb};
use crate::pcx::types::{PcxImage, PcxPixels};

pub struct PcxReader {}

impl PcxReader {
    pub fn parse(data: &[u8]) -> Result<PcxImage, ParserError> {
        let mut rdr = ByteStream::new(data);
        let size = rdr.read_u32()? as u64;
        let width = rdr.read_u32()?;
        let height = rdr.read_u32()?;
        let pixel_count = width as u64 * height as u64;

        let pixels = if size == pixel_count {
            let indices = rdr.read_bytes(pixel_count as usize)?.to_vec();
            let mut colors = [Color::TRANSPARENT; PALETTE_SIZE];
            for color in colors.iter_mut() {
                *color = Rgb::parse(&mut rdr)?.into();
            }
            colors[0] = Color::TRANSPARENT;
            PcxPixels::Indexed {
                indices,
                palette: Palette::new(colors),
            }
        } else if size == pixel_count * 3 {
            PcxPixels::Bgr(rdr.read_bytes(size as usize)?.to_vec())
        } else {
            return Err(ParserError::FormatError {
                reason: "PCX size matches neither an indexed nor a BGR bitmap",
            });
        };

        Ok(PcxImage { width, height, pixels })
    }
}
