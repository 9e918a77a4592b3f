use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{error, info, warn};

use crate::io::backend::ArchiveBackend;
use crate::io::error::ResourceError;
use crate::io::vfs::VirtualFilesystem;

pub const DATA_PREFIX: &str = "DATA/";
pub const SPRITES_PREFIX: &str = "SPRITES/";
pub const MAPS_PREFIX: &str = "MAPS/";
pub const VIDEO_PREFIX: &str = "VIDEO/";

/// The one LOD whose content is mounted below `SPRITES/` instead of `DATA/`
const SPRITE_ARCHIVE: &str = "h3sprite.lod";

/// The installation may come from a case-insensitive file system, so `Data`, `DATA` and `data`
/// are all accepted.
fn find_child(dir: &Path, name: &str) -> Option<PathBuf> {
    let exact = dir.join(name);
    if exact.exists() {
        return Some(exact);
    }

    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_name().to_string_lossy().eq_ignore_ascii_case(name))
        .map(|entry| entry.path())
}

fn archives_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return vec![];
    };

    read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .sorted_by_key(|path| path.file_name().map(|name| name.to_ascii_lowercase()))
        .collect_vec()
}

fn archive_prefix(path: &Path, extension: &str) -> &'static str {
    let is_sprites = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(SPRITE_ARCHIVE));

    match extension {
        "vid" => VIDEO_PREFIX,
        _ if is_sprites => SPRITES_PREFIX,
        _ => DATA_PREFIX,
    }
}

/// Registers the archives and directories of a game installation in override order: the
/// archives below `Data/`, then the loose files in `Data/`, `Sprites/` and `Maps/`, then every
/// extra (mod) directory. Extra directories mirror the installation layout, e.g.
/// `<mod>/Data/TOWN.png` overrides `DATA/TOWN`. An archive that cannot be opened is logged and
/// left out.
pub fn register_default_search_paths<P: AsRef<Path>>(
    vfs: &mut VirtualFilesystem,
    data_dir: P,
    extra_dirs: &[PathBuf],
) -> Result<(), ResourceError> {
    let data_dir = data_dir.as_ref();
    if !data_dir.is_dir() {
        warn!("Data directory {} does not exist", data_dir.display());
    }

    let archive_dir = find_child(data_dir, "Data");
    if let Some(archive_dir) = &archive_dir {
        for extension in ["lod", "snd", "vid"] {
            for path in archives_with_extension(archive_dir, extension) {
                let prefix = archive_prefix(&path, extension);
                match ArchiveBackend::open_by_extension(&path, prefix) {
                    Ok(backend) => {
                        info!("Mounting {} at {}", path.display(), prefix);
                        vfs.register(backend);
                    }
                    Err(e) => error!("Skipping unreadable archive {}: {}", path.display(), e),
                }
            }
        }
    }

    for (directory, prefix) in [
        ("Data", DATA_PREFIX),
        ("Sprites", SPRITES_PREFIX),
        ("Maps", MAPS_PREFIX),
    ] {
        if let Some(path) = find_child(data_dir, directory) {
            vfs.register(ArchiveBackend::flat(path, prefix));
        }
    }

    for extra in extra_dirs {
        info!("Mounting mod directory {}", extra.display());
        vfs.register(ArchiveBackend::flat(extra, ""));
    }

    Ok(())
}
