use log::debug;
use lodrust_files::ParserError;
use lodrust_files::def::types::DefContainer;

use crate::rendering::animation::{Animation, LoadScope};
use crate::rendering::image::compact::CompactRunSink;
use crate::rendering::image::raw::RawPixelSink;
use crate::rendering::image::{DecodedSprite, StorageKind};

pub struct DefLoader {}

impl DefLoader {
    pub fn decode_sprite(
        container: &DefContainer,
        group: u32,
        frame: u32,
        storage: StorageKind,
    ) -> Result<DecodedSprite, ParserError> {
        let shadows = container.has_shadow_convention();
        let (pixels, palette, margins, full_size) = match storage {
            StorageKind::Compact => {
                let mut sink = CompactRunSink::new();
                container.decode_frame(group, frame, &mut sink)?;
                sink.into_parts()
            }
            StorageKind::Raw => {
                let mut sink = RawPixelSink::new();
                container.decode_frame(group, frame, &mut sink)?;
                sink.into_parts()
            }
        };

        Ok(DecodedSprite::new(pixels, palette, margins, full_size, shadows))
    }

    /// Decodes every frame in `scope`. A group that is not part of the sheet is an error, as
    /// is any single frame failing to decode.
    pub fn decode_animation(container: &DefContainer, scope: LoadScope) -> Result<Animation, ParserError> {
        let entries = container.entries();
        let mut animation = Animation::new(entries.clone());

        let groups: Vec<(u32, u32)> = match scope {
            LoadScope::Nothing => vec![],
            LoadScope::All => entries.into_iter().collect(),
            LoadScope::Group(group) => {
                let count = entries
                    .get(&group)
                    .copied()
                    .ok_or(ParserError::FrameNotFound { group, frame: 0 })?;
                vec![(group, count)]
            }
        };

        for (group, count) in groups {
            let frames = (0..count)
                .map(|frame| Self::decode_sprite(container, group, frame, StorageKind::Compact))
                .collect::<Result<Vec<_>, _>>()?;
            debug!("Decoded group {} with {} frames", group, frames.len());
            animation.insert_group(group, frames);
        }

        animation.set_scope(scope);
        Ok(animation)
    }
}
