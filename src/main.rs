use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use itertools::Itertools;
use lodrust::io::bootstrap::register_default_search_paths;
use lodrust::io::common::resource_id::{ResourceIdentifier, ResourceKind, adapt_resource_name};
use lodrust::io::vfs::VirtualFilesystem;
use lodrust::rendering::asset_graph::cache::ResourceCache;
use lodrust::rendering::asset_graph::locator::FrameSelector;
use lodrust::settings::{CliArgs, Command};
use lodrust_files::def::types::DefContainer;

/// Accepts names with or without extension, e.g. `Sprites/AVWANGL.def` or `SPRITES/AVWANGL`.
fn sprite_identifier(name: &str) -> ResourceIdentifier {
    let (stem, _) = adapt_resource_name(name);
    ResourceIdentifier::new(&stem, ResourceKind::Animation)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let extra_dirs = args.extra_dirs.iter().map(PathBuf::from).collect_vec();
    let mut vfs = VirtualFilesystem::new();
    register_default_search_paths(&mut vfs, &args.data_dir, &extra_dirs)
        .with_context(|| format!("Mounting the archives of {}", args.data_dir))?;
    let vfs = Arc::new(vfs);

    match args.command {
        Command::List { prefix, kind } => {
            for file in vfs.files_with_prefix(&prefix, kind) {
                println!(
                    "{}\t{:?}\t{} ({})",
                    file.identifier.name(),
                    file.identifier.kind(),
                    file.name(),
                    vfs.describe_backend(file.locator.backend).unwrap_or("?")
                );
            }
        }
        Command::Dump {
            name,
            kind,
            out,
            earliest,
        } => {
            let (stem, _) = adapt_resource_name(&name);
            let identifier = ResourceIdentifier::new(&stem, kind);
            let written = vfs.dump(&identifier, earliest, &out)?;
            println!("Wrote {} bytes of {} to {}", written, identifier, out);
        }
        Command::Frames { name } => {
            let identifier = sprite_identifier(&name);
            let bytes = vfs.fetch_identifier(&identifier, false)?;
            let container = DefContainer::parse(&bytes).with_context(|| format!("Parsing {}", identifier))?;
            println!("{}: format tag {}", identifier, container.format_tag());
            for (group, count) in container.entries() {
                println!("  group {:>3}: {} frames", group, count);
            }
        }
        Command::ExportFrame {
            name,
            group,
            frame,
            out,
            owner,
        } => {
            let identifier = sprite_identifier(&name);
            let mut selector = FrameSelector::frame(group, frame);
            if let Some(owner) = owner {
                selector = selector.with_owner(owner);
            }

            let cache = ResourceCache::with_game_palettes(vfs.clone());
            let sprite = cache.try_get_image(&identifier, selector, false)?;
            if sprite.width() == 0 || sprite.height() == 0 {
                bail!("{} group {} frame {} is empty", identifier, group, frame);
            }

            let image = image::RgbaImage::from_raw(sprite.width(), sprite.height(), sprite.to_rgba())
                .context("Frame buffer does not match its dimensions")?;
            image
                .save_with_format(&out, image::ImageFormat::Png)
                .with_context(|| format!("Writing {}", out))?;
            println!("Exported {} ({}x{}) to {}", identifier, sprite.width(), sprite.height(), out);
        }
    }

    Ok(())
}
