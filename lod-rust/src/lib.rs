//! A library for reading LOD, SND and VID archives

#![allow(clippy::unreadable_literal)]

mod archive;
mod compression;
mod media;
mod util;

pub use crate::archive::{LodArchive, LodEntry};
pub use crate::compression::{gunzip, inflate_exact};
pub use crate::media::{MediaEntry, SndArchive, VidArchive};
