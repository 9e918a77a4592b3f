use clap::{Parser, Subcommand};

use crate::io::common::resource_id::ResourceKind;

#[derive(Parser, Debug)]
#[command(name = "lodrust")]
#[command(version)]
#[command(about = "Inspects and extracts the assets of a Heroes III installation")]
pub struct CliArgs {
    /// The game installation, containing `Data/`, `Sprites/` and `Maps/`
    #[arg(long, env = "LODRUST_DATA_DIR", default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Mod directories that mirror the installation layout, later ones take precedence
    #[arg(long = "extra-dir")]
    pub extra_dirs: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

pub fn default_data_dir() -> String {
    std::env::current_dir()
        .unwrap_or_default()
        .join("_data")
        .to_string_lossy()
        .to_string()
}

fn parse_kind(value: &str) -> Result<ResourceKind, String> {
    ResourceKind::from_name(value).ok_or_else(|| {
        format!(
            "unknown resource kind {}, expected one of text, animation, mask, campaign, map, font, \
             graphics, video, sound, savegame, other",
            value
        )
    })
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lists the known resources
    List {
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<ResourceKind>,
    },
    /// Writes the raw bytes of a resource to a file
    Dump {
        name: String,
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        out: String,
        /// Skip the overrides and take the resource from the first archive that has it
        #[arg(long)]
        earliest: bool,
    },
    /// Prints the groups and frame counts of a sprite sheet
    Frames { name: String },
    /// Decodes one frame of a sprite sheet and saves it as PNG
    ExportFrame {
        name: String,
        group: u32,
        frame: u32,
        out: String,
        #[arg(long)]
        owner: Option<u8>,
    },
}
