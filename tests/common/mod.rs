#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;

/// An uncompressed DEF frame with margins (1, 2) inside a frame two pixels larger than the
/// content in both directions.
pub fn def_frame(rows: &[&[u8]]) -> Vec<u8> {
    let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
    let body = rows.concat();
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(body.len() as u32).unwrap();
    buf.write_u32::<LittleEndian>(0).unwrap();
    buf.write_u32::<LittleEndian>(width + 2).unwrap();
    buf.write_u32::<LittleEndian>(rows.len() as u32 + 2).unwrap();
    buf.write_u32::<LittleEndian>(width).unwrap();
    buf.write_u32::<LittleEndian>(rows.len() as u32).unwrap();
    buf.write_i32::<LittleEndian>(1).unwrap();
    buf.write_i32::<LittleEndian>(2).unwrap();
    buf.extend(body);
    buf
}

/// Palette entry `i` is `(i, i / 2, 255 - i)`.
pub fn build_def(format_tag: u32, groups: &[(u32, Vec<Vec<u8>>)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(format_tag).unwrap();
    buf.write_u32::<LittleEndian>(0).unwrap();
    buf.write_u32::<LittleEndian>(0).unwrap();
    buf.write_u32::<LittleEndian>(groups.len() as u32).unwrap();
    for i in 0..256u32 {
        buf.extend_from_slice(&[i as u8, (i / 2) as u8, 255 - i as u8]);
    }

    let table_len: usize = groups.iter().map(|(_, frames)| 16 + frames.len() * (13 + 4)).sum();
    let mut frame_offset = buf.len() + table_len;
    let mut frame_data = Vec::new();
    for (group, frames) in groups {
        buf.write_u32::<LittleEndian>(*group).unwrap();
        buf.write_u32::<LittleEndian>(frames.len() as u32).unwrap();
        buf.extend_from_slice(&[0u8; 8]);
        for index in 0..frames.len() {
            let mut name = format!("f{group}_{index}").into_bytes();
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

/// A sheet with group 0 (two frames) and group 1 (one frame), all using the player band.
pub fn hero_def() -> Vec<u8> {
    build_def(
        0x49,
        &[
            (
                0,
                vec![
                    def_frame(&[&[0, 230, 230], &[9, 10, 11]]),
                    def_frame(&[&[0, 231, 0], &[12, 12, 12]]),
                ],
            ),
            (1, vec![def_frame(&[&[225, 226], &[5, 1]])]),
        ],
    )
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Writes a LOD archive, every entry compressed.
pub fn write_lod(path: &Path, entries: &[(&str, &[u8])]) {
    let mut buf = vec![0u8; 0x5C];
    buf[..4].copy_from_slice(b"LOD\0");
    buf[8..12].copy_from_slice(&(entries.len() as u32).to_le_bytes());

    let mut offset = 0x5C + entries.len() * 32;
    let mut payload = Vec::new();
    for (name, data) in entries {
        let stored = compress(data);
        let mut fixed = name.as_bytes().to_vec();
        fixed.resize(16, 0);
        buf.extend(fixed);
        buf.write_u32::<LittleEndian>(offset as u32).unwrap();
        buf.write_u32::<LittleEndian>(data.len() as u32).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(stored.len() as u32).unwrap();
        offset += stored.len();
        payload.extend(stored);
    }
    buf.extend(payload);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, buf).unwrap();
}

pub fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
}
