use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;
use crate::common::types::{Color, Palette, Point};
use crate::def::types::{DEF_FRAME_HEADER_SIZE, DefContainer, FrameSink, SHADOW_PALETTE};

/// Collects the decoded frame as a flat bitmap, one `Vec` per line.
#[derive(Default)]
struct LineCollector {
    content_size: Point,
    margins: Point,
    full_size: Point,
    lines: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl FrameSink for LineCollector {
    fn init(&mut self, content_size: Point, margins: Point, full_size: Point, _palette: &Palette) {
        self.content_size = content_size;
        self.margins = margins;
        self.full_size = full_size;
    }

    fn load_raw(&mut self, data: &[u8]) {
        self.current.extend_from_slice(data);
    }

    fn load_fill(&mut self, count: usize, color: u8) {
        self.current.extend(std::iter::repeat(color).take(count));
    }

    fn end_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
    }
}

fn frame_header(format: u32, width: u32, height: u32, body_len: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(body_len as u32).unwrap();
    buf.write_u32::<LittleEndian>(format).unwrap();
    buf.write_u32::<LittleEndian>(width + 4).unwrap();
    buf.write_u32::<LittleEndian>(height + 2).unwrap();
    buf.write_u32::<LittleEndian>(width).unwrap();
    buf.write_u32::<LittleEndian>(height).unwrap();
    buf.write_i32::<LittleEndian>(3).unwrap();
    buf.write_i32::<LittleEndian>(1).unwrap();
    assert_eq!(buf.len(), DEF_FRAME_HEADER_SIZE);
    buf
}

fn uncompressed_frame(rows: &[&[u8]]) -> Vec<u8> {
    let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
    let body: Vec<u8> = rows.concat();
    let mut buf = frame_header(0, width, rows.len() as u32, body.len());
    buf.extend(body);
    buf
}

/// rows of (kind, length, raw bytes)
fn segments_frame(width: u32, rows: &[Vec<(u8, u8, Vec<u8>)>]) -> Vec<u8> {
    let mut table = Vec::new();
    let mut body = Vec::new();
    let table_len = rows.len() * 4;
    for row in rows {
        table.write_u32::<LittleEndian>((table_len + body.len()) as u32).unwrap();
        for (kind, length, raw) in row {
            body.push(*kind);
            body.push(length - 1);
            body.extend_from_slice(raw);
        }
    }
    let mut buf = frame_header(1, width, rows.len() as u32, table.len() + body.len());
    buf.extend(table);
    buf.extend(body);
    buf
}

fn packed_segment(code: u8, length: u8) -> u8 {
    (code << 5) | (length - 1)
}

fn packed_frame(width: u32, rows: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = rows.concat();
    let mut buf = frame_header(2, width, rows.len() as u32, 2 + body.len());
    buf.write_u16::<LittleEndian>(2).unwrap();
    buf.extend(body);
    buf
}

fn packed_row_table_frame(width: u32, rows: &[Vec<u8>]) -> Vec<u8> {
    let blocks_per_row = (width / 32) as usize;
    let table_len = rows.len() * blocks_per_row * 2;
    let mut table = vec![0u8; table_len];
    let mut body = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let offset = (table_len + body.len()) as u16;
        table[index * blocks_per_row * 2..index * blocks_per_row * 2 + 2].copy_from_slice(&offset.to_le_bytes());
        body.extend_from_slice(row);
    }
    let mut buf = frame_header(3, width, rows.len() as u32, table.len() + body.len());
    buf.extend(table);
    buf.extend(body);
    buf
}

/// Builds a container with the given groups; every frame is already encoded.
fn build_def(format_tag: u32, groups: &[(u32, Vec<Vec<u8>>)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(format_tag).unwrap();
    buf.write_u32::<LittleEndian>(0).unwrap();
    buf.write_u32::<LittleEndian>(0).unwrap();
    buf.write_u32::<LittleEndian>(groups.len() as u32).unwrap();
    for i in 0..256u32 {
        buf.extend_from_slice(&[i as u8, (i / 2) as u8, 255 - i as u8]);
    }

    let table_len: usize = groups
        .iter()
        .map(|(_, frames)| 16 + frames.len() * (13 + 4))
        .sum();
    let mut frame_offset = buf.len() + table_len;
    let mut frame_data = Vec::new();

    for (group, frames) in groups {
        buf.write_u32::<LittleEndian>(*group).unwrap();
        buf.write_u32::<LittleEndian>(frames.len() as u32).unwrap();
        buf.extend_from_slice(&[0u8; 8]);
        for index in 0..frames.len() {
            let mut name = format!("frame{group}_{index}").into_bytes();
            name.resize(13, 0);
            buf.extend(name);
        }
        for frame in frames {
            buf.write_u32::<LittleEndian>(frame_offset as u32).unwrap();
            frame_offset += frame.len();
            frame_data.extend_from_slice(frame);
        }
    }
    buf.extend(frame_data);
    buf
}

fn decode(container: &DefContainer, group: u32, frame: u32) -> Result<LineCollector, ParserError> {
    let mut sink = LineCollector::default();
    container.decode_frame(group, frame, &mut sink)?;
    Ok(sink)
}

#[test]
fn entries_and_missing_frames() -> Result<(), anyhow::Error> {
    let frame = uncompressed_frame(&[&[9, 9], &[10, 11]]);
    let data = build_def(
        0x42,
        &[
            (0, vec![frame.clone(), frame.clone(), frame.clone()]),
            (1, vec![frame]),
        ],
    );
    let container = DefContainer::parse(&data)?;

    let entries = container.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[&0], 3);
    assert_eq!(entries[&1], 1);

    let sink = decode(&container, 1, 0)?;
    assert_eq!(sink.lines, vec![vec![9, 9], vec![10, 11]]);
    assert_eq!(sink.content_size, Point::new(2, 2));
    assert_eq!(sink.margins, Point::new(3, 1));
    assert_eq!(sink.full_size, Point::new(6, 4));

    assert!(matches!(
        decode(&container, 2, 0),
        Err(ParserError::FrameNotFound { group: 2, frame: 0 })
    ));
    assert!(matches!(
        decode(&container, 0, 3),
        Err(ParserError::FrameNotFound { group: 0, frame: 3 })
    ));
    Ok(())
}

#[test]
fn palette_shadow_convention() -> Result<(), anyhow::Error> {
    let data = build_def(0x42, &[]);
    let container = DefContainer::parse(&data)?;
    assert!(container.has_shadow_convention());
    assert_eq!(&container.palette().colors[..8], &SHADOW_PALETTE);
    assert_eq!(container.palette().get(8), Color::opaque(8, 4, 247));

    let data = build_def(71, &[]);
    let container = DefContainer::parse(&data)?;
    assert!(!container.has_shadow_convention());
    assert!(container.palette().colors[..8].iter().all(|c| *c == Color::TRANSPARENT));
    assert_eq!(container.palette().get(255), Color::opaque(255, 127, 0));
    Ok(())
}

#[test]
fn segments_format() -> Result<(), anyhow::Error> {
    let frame = segments_frame(
        5,
        &[
            vec![(0, 2, vec![]), (0xFF, 3, vec![20, 21, 22])],
            vec![(0xFF, 1, vec![30]), (7, 4, vec![])],
        ],
    );
    let data = build_def(0x42, &[(0, vec![frame])]);
    let container = DefContainer::parse(&data)?;
    let sink = decode(&container, 0, 0)?;
    assert_eq!(sink.lines, vec![vec![0, 0, 20, 21, 22], vec![30, 7, 7, 7, 7]]);
    Ok(())
}

#[test]
fn segments_overshooting_the_width_are_corrupt() -> Result<(), anyhow::Error> {
    let frame = segments_frame(4, &[vec![(0, 3, vec![]), (0, 2, vec![])]]);
    let data = build_def(0x42, &[(0, vec![frame])]);
    let container = DefContainer::parse(&data)?;
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::RowLengthMismatch {
            row: 0,
            decoded: 5,
            expected: 4
        })
    ));
    Ok(())
}

#[test]
fn packed_format() -> Result<(), anyhow::Error> {
    let rows = vec![
        vec![packed_segment(0, 3), packed_segment(7, 2), 40, 41],
        vec![packed_segment(5, 5)],
    ];
    let data = build_def(0x42, &[(0, vec![packed_frame(5, &rows)])]);
    let container = DefContainer::parse(&data)?;
    let sink = decode(&container, 0, 0)?;
    assert_eq!(sink.lines, vec![vec![0, 0, 0, 40, 41], vec![5, 5, 5, 5, 5]]);
    Ok(())
}

#[test]
fn segments_ending_short_of_the_width_are_truncated() -> Result<(), anyhow::Error> {
    // the only row covers 3 of 5 pixels and the data ends there
    let frame = segments_frame(5, &[vec![(0, 2, vec![]), (0xFF, 1, vec![9])]]);
    let data = build_def(0x42, &[(0, vec![frame])]);
    let container = DefContainer::parse(&data)?;
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::OutOfBounds { .. })
    ));
    Ok(())
}

#[test]
fn packed_segments_overshooting_the_width_are_corrupt() -> Result<(), anyhow::Error> {
    // the second segment of row 0 runs past the declared width of 4
    let rows = vec![vec![packed_segment(1, 3), packed_segment(1, 3)]];
    let data = build_def(0x42, &[(0, vec![packed_frame(4, &rows)])]);
    let container = DefContainer::parse(&data)?;
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::RowLengthMismatch {
            row: 0,
            decoded: 6,
            expected: 4
        })
    ));
    Ok(())
}

#[test]
fn packed_segments_ending_short_of_the_width_are_truncated() -> Result<(), anyhow::Error> {
    let rows = vec![vec![packed_segment(1, 3)]];
    let data = build_def(0x42, &[(0, vec![packed_frame(5, &rows)])]);
    let container = DefContainer::parse(&data)?;
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::OutOfBounds { .. })
    ));
    Ok(())
}

#[test]
fn packed_row_table_format() -> Result<(), anyhow::Error> {
    let width = 32u32;
    let rows = vec![
        vec![packed_segment(0, 30), packed_segment(7, 2), 50, 51],
        vec![packed_segment(2, 32)],
        vec![packed_segment(7, 1), 60, packed_segment(0, 31)],
    ];
    let data = build_def(0x42, &[(4, vec![packed_row_table_frame(width, &rows)])]);
    let container = DefContainer::parse(&data)?;
    let sink = decode(&container, 4, 0)?;

    let mut first = vec![0u8; 30];
    first.extend([50, 51]);
    let mut third = vec![60u8];
    third.extend(vec![0u8; 31]);
    assert_eq!(sink.lines, vec![first, vec![2u8; 32], third]);
    Ok(())
}

#[test]
fn packed_row_table_overshooting_the_width_is_corrupt() -> Result<(), anyhow::Error> {
    let rows = vec![vec![packed_segment(0, 30), packed_segment(1, 5)]];
    let data = build_def(0x42, &[(0, vec![packed_row_table_frame(32, &rows)])]);
    let container = DefContainer::parse(&data)?;
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::RowLengthMismatch {
            row: 0,
            decoded: 35,
            expected: 32
        })
    ));
    Ok(())
}

#[test]
fn packed_row_table_ending_short_of_the_width_is_truncated() -> Result<(), anyhow::Error> {
    let rows = vec![vec![packed_segment(0, 10)]];
    let data = build_def(0x42, &[(0, vec![packed_row_table_frame(32, &rows)])]);
    let container = DefContainer::parse(&data)?;
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::OutOfBounds { .. })
    ));
    Ok(())
}

#[test]
fn frame_placement_out_of_range() -> Result<(), anyhow::Error> {
    // full_width, full_height, left_margin, top_margin
    let patches: [(usize, [u8; 4]); 5] = [
        (8, 0x10000u32.to_le_bytes()),
        (12, u32::MAX.to_le_bytes()),
        (24, i32::MAX.to_le_bytes()),
        (24, i32::MIN.to_le_bytes()),
        (28, (-0x8000i32).to_le_bytes()),
    ];

    for (field, value) in patches {
        let mut frame = uncompressed_frame(&[&[1, 2], &[3, 4]]);
        frame[field..field + 4].copy_from_slice(&value);
        let data = build_def(0x42, &[(0, vec![frame])]);
        let container = DefContainer::parse(&data)?;
        assert!(
            matches!(decode(&container, 0, 0), Err(ParserError::FormatError { .. })),
            "field at {field} accepted"
        );
    }

    // negative margins within range are still fine
    let mut frame = uncompressed_frame(&[&[1, 2]]);
    frame[24..28].copy_from_slice(&(-5i32).to_le_bytes());
    let data = build_def(0x42, &[(0, vec![frame])]);
    let container = DefContainer::parse(&data)?;
    let sink = decode(&container, 0, 0)?;
    assert_eq!(sink.margins, Point::new(-5, 1));
    Ok(())
}

#[test]
fn unsupported_pixel_format() -> Result<(), anyhow::Error> {
    let mut frame = uncompressed_frame(&[&[1]]);
    frame[4..8].copy_from_slice(&9u32.to_le_bytes());
    let data = build_def(0x42, &[(0, vec![frame])]);
    let container = DefContainer::parse(&data)?;
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::UnsupportedPixelFormat { format: 9 })
    ));
    Ok(())
}

#[test]
fn truncated_container() {
    let frame = uncompressed_frame(&[&[1, 2, 3], &[4, 5, 6]]);
    let mut data = build_def(0x42, &[(0, vec![frame])]);
    data.truncate(data.len() - 2);
    let container = DefContainer::parse(&data).expect("the header is intact");
    assert!(matches!(
        decode(&container, 0, 0),
        Err(ParserError::OutOfBounds { .. })
    ));

    let header_only = &data[..100];
    assert!(matches!(
        DefContainer::parse(header_only),
        Err(ParserError::IOError(_))
    ));
}
