use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;
use crate::common::types::Color;
use crate::pcx::reader::PcxReader;
use crate::pcx::types::PcxPixels;

fn header(size: u32, width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(size).unwrap();
    buf.write_u32::<LittleEndian>(width).unwrap();
    buf.write_u32::<LittleEndian>(height).unwrap();
    buf
}

#[test]
fn indexed_bitmap() -> Result<(), anyhow::Error> {
    let mut data = header(6, 3, 2);
    data.extend_from_slice(&[0, 1, 2, 2, 1, 0]);
    for i in 0..256u32 {
        data.extend_from_slice(&[i as u8, 0, 0]);
    }

    let image = PcxReader::parse(&data)?;
    assert_eq!((image.width, image.height), (3, 2));
    match image.pixels {
        PcxPixels::Indexed { indices, palette } => {
            assert_eq!(indices, vec![0, 1, 2, 2, 1, 0]);
            assert_eq!(palette.get(0), Color::TRANSPARENT);
            assert_eq!(palette.get(2), Color::opaque(2, 0, 0));
        }
        PcxPixels::Bgr(_) => panic!("expected an indexed bitmap"),
    }
    Ok(())
}

#[test]
fn bgr_bitmap() -> Result<(), anyhow::Error> {
    let mut data = header(6, 2, 1);
    data.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
    let image = PcxReader::parse(&data)?;
    assert!(matches!(image.pixels, PcxPixels::Bgr(ref bgr) if bgr == &[1, 2, 3, 4, 5, 6]));
    Ok(())
}

#[test]
fn inconsistent_size() {
    let mut data = header(7, 2, 1);
    data.extend_from_slice(&[0; 7]);
    assert!(matches!(
        PcxReader::parse(&data),
        Err(ParserError::FormatError { .. })
    ));

    let data = header(6, 2, 1);
    assert!(matches!(
        PcxReader::parse(&data),
        Err(ParserError::OutOfBounds { .. })
    ));
}
