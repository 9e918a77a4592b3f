use std::sync::Arc;

use log::{debug, error, trace, warn};
use lodrust_files::def::types::DefContainer;

use crate::io::common::resource_id::{ResourceIdentifier, ResourceKind};
use crate::io::error::ResourceError;
use crate::io::vfs::VirtualFilesystem;
use crate::rendering::animation::{Animation, LoadScope};
use crate::rendering::asset_graph::locator::{FrameSelector, GraphicsLocator};
use crate::rendering::asset_graph::resolver::Resolver;
use crate::rendering::image::effects::PlayerPalettes;
use crate::rendering::image::{DecodedSprite, StorageKind};
use crate::rendering::loader::bitmap_loader::BitmapLoader;
use crate::rendering::loader::def_loader::DefLoader;

pub const PLAYER_PALETTE: &str = "DATA/PLAYERS";
pub const NEUTRAL_PALETTE: &str = "DATA/NEUTRAL";

/// Entry point for decoded graphics: resolves identifiers through the filesystem, decodes on a
/// miss and hands out shared references. Nothing is kept alive by the cache itself.
pub struct ResourceCache {
    vfs: Arc<VirtualFilesystem>,
    palettes: PlayerPalettes,
    images: Resolver<DecodedSprite>,
    animations: Resolver<Animation>,
}

/// Missing resources are a normal outcome (mods), broken ones are worth an error.
fn log_failure(what: &ResourceIdentifier, error: &ResourceError) {
    match error {
        ResourceError::NotFound { .. } => warn!("Could not load {}: {}", what, error),
        _ => error!("Failed to load {}: {}", what, error),
    }
}

impl ResourceCache {
    pub fn new(vfs: Arc<VirtualFilesystem>, palettes: PlayerPalettes) -> Self {
        Self {
            vfs,
            palettes,
            images: Resolver::new(),
            animations: Resolver::new(),
        }
    }

    /// Uses the game's player palettes when they are available, synthesized ones otherwise.
    pub fn with_game_palettes(vfs: Arc<VirtualFilesystem>) -> Self {
        let players = ResourceIdentifier::new(PLAYER_PALETTE, ResourceKind::Other);
        let neutral = ResourceIdentifier::new(NEUTRAL_PALETTE, ResourceKind::Other);

        let palettes = vfs
            .fetch_identifier(&players, false)
            .and_then(|players| {
                let neutral = vfs.fetch_identifier(&neutral, false)?;
                PlayerPalettes::from_pal_bytes(&players, &neutral)
            })
            .unwrap_or_else(|e| {
                debug!("Using the default player palettes: {}", e);
                PlayerPalettes::default()
            });

        Self::new(vfs, palettes)
    }

    pub fn vfs(&self) -> &Arc<VirtualFilesystem> {
        &self.vfs
    }

    pub fn palettes(&self) -> &PlayerPalettes {
        &self.palettes
    }

    pub fn images(&self) -> &Resolver<DecodedSprite> {
        &self.images
    }

    pub fn animations(&self) -> &Resolver<Animation> {
        &self.animations
    }

    /// `None` when the image is missing or broken, the cause is logged.
    pub fn get_image(
        &self,
        identifier: &ResourceIdentifier,
        selector: FrameSelector,
        use_earliest: bool,
    ) -> Option<Arc<DecodedSprite>> {
        self.try_get_image(identifier, selector, use_earliest)
            .inspect_err(|e| log_failure(identifier, e))
            .ok()
    }

    /// Images come either from a sprite sheet (`Animation` kind, `selector` picks the frame) or
    /// from a single bitmap (`Graphics` kind). An owner in `selector` is applied to the base
    /// decode through the copy-on-write path.
    pub fn try_get_image(
        &self,
        identifier: &ResourceIdentifier,
        selector: FrameSelector,
        use_earliest: bool,
    ) -> Result<Arc<DecodedSprite>, ResourceError> {
        let locator = self.vfs.resolve(identifier, use_earliest)?;
        let selector = selector.resolved(locator.extension() == ".DEF");
        let key = GraphicsLocator::new(locator.clone(), selector);

        if let Some(image) = self.images.get(&key) {
            trace!("Cache hit for {}", key);
            return Ok(image);
        }

        let base_key = key.with_selector(selector.untransformed());
        let base = self.images.get_or_generate(&base_key, |key| self.decode_image(key))?;

        Ok(match selector.owner {
            None => base,
            Some(owner) => self.images.get_transformed(
                base,
                |image| image.recolor_to_owner(owner, &self.palettes),
                &key,
            ),
        })
    }

    pub fn get_animation(
        &self,
        identifier: &ResourceIdentifier,
        group: Option<u32>,
        use_earliest: bool,
    ) -> Option<Arc<Animation>> {
        self.try_get_animation(identifier, group, use_earliest)
            .inspect_err(|e| log_failure(identifier, e))
            .ok()
    }

    /// The whole sheet when `group` is `None`, otherwise only that group.
    pub fn try_get_animation(
        &self,
        identifier: &ResourceIdentifier,
        group: Option<u32>,
        use_earliest: bool,
    ) -> Result<Arc<Animation>, ResourceError> {
        let locator = self.vfs.resolve(identifier, use_earliest)?;
        let key = GraphicsLocator::new(
            locator.clone(),
            FrameSelector {
                group,
                ..Default::default()
            },
        );
        self.animations.get_or_generate(&key, |key| self.decode_animation(key))
    }

    /// An animation with the player band of every loaded frame set to `owner`.
    pub fn get_recolored_animation(
        &self,
        identifier: &ResourceIdentifier,
        group: Option<u32>,
        owner: u8,
        use_earliest: bool,
    ) -> Option<Arc<Animation>> {
        let base = self.get_animation(identifier, group, use_earliest)?;
        let key = base.locator()?.clone();
        let key = key.with_selector(key.selector.with_owner(owner));

        Some(self.animations.get_transformed(
            base,
            |animation| animation.recolor_to_owner(owner, &self.palettes),
            &key,
        ))
    }

    fn decode_image(&self, key: &GraphicsLocator) -> Result<DecodedSprite, ResourceError> {
        let bytes = self.vfs.fetch(&key.locator)?;
        let name = key.locator.entry_name.as_str();
        let extension = key.locator.extension();

        if extension == ".DEF" {
            let container = DefContainer::parse(&bytes).map_err(|e| ResourceError::from_parser(name, e))?;
            let group = key.selector.group.unwrap_or(0);
            let frame = key.selector.frame.unwrap_or(0);
            debug!("Decoding {} group {} frame {}", name, group, frame);
            DefLoader::decode_sprite(&container, group, frame, StorageKind::Compact)
                .map_err(|e| ResourceError::from_parser(name, e))
        } else {
            BitmapLoader::decode(name, &bytes, &extension)
        }
    }

    fn decode_animation(&self, key: &GraphicsLocator) -> Result<Animation, ResourceError> {
        let bytes = self.vfs.fetch(&key.locator)?;
        let name = key.locator.entry_name.as_str();
        if key.locator.extension() != ".DEF" {
            return Err(ResourceError::corrupt(name, "not a sprite sheet"));
        }

        let container = DefContainer::parse(&bytes).map_err(|e| ResourceError::from_parser(name, e))?;
        debug!("Decoding animation {}", key);
        DefLoader::decode_animation(&container, LoadScope::from_group(key.selector.group))
            .map_err(|e| ResourceError::from_parser(name, e))
    }
}
