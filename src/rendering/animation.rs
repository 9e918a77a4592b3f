use std::collections::BTreeMap;
use std::sync::Arc;

use crate::rendering::asset_graph::locator::GraphicsLocator;
use crate::rendering::common::surface::Surface;
use crate::rendering::image::DecodedSprite;
use crate::rendering::image::effects::{Flip, GlowKind, PlayerPalettes};

/// Which groups of a sheet have been decoded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum LoadScope {
    #[default]
    Nothing,
    All,
    Group(u32),
}

impl LoadScope {
    pub fn from_group(group: Option<u32>) -> Self {
        group.map(LoadScope::Group).unwrap_or(LoadScope::All)
    }

    pub fn includes(&self, group: u32) -> bool {
        match self {
            LoadScope::Nothing => false,
            LoadScope::All => true,
            LoadScope::Group(loaded) => *loaded == group,
        }
    }
}

/// The decoded frames of a sprite sheet, `frames[group][frame]`. Frames are shared, mutating
/// them clones a frame only while somebody else still holds it.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    /// group -> frame count of the whole sheet, not only the loaded part
    entries: BTreeMap<u32, u32>,
    frames: BTreeMap<u32, Vec<Arc<DecodedSprite>>>,
    scope: LoadScope,
    locator: Option<GraphicsLocator>,
}

impl Animation {
    pub fn new(entries: BTreeMap<u32, u32>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn insert_group(&mut self, group: u32, frames: Vec<DecodedSprite>) {
        self.frames.insert(group, frames.into_iter().map(Arc::new).collect());
    }

    pub(crate) fn set_scope(&mut self, scope: LoadScope) {
        self.scope = scope;
    }

    pub fn entries(&self) -> &BTreeMap<u32, u32> {
        &self.entries
    }

    pub fn scope(&self) -> LoadScope {
        self.scope
    }

    pub fn loaded_groups(&self) -> impl Iterator<Item = u32> + '_ {
        self.frames.keys().copied()
    }

    pub fn frame(&self, group: u32, frame: u32) -> Option<&Arc<DecodedSprite>> {
        self.frames.get(&group)?.get(frame as usize)
    }

    pub fn frame_count(&self, group: u32) -> usize {
        self.frames.get(&group).map(Vec::len).unwrap_or(0)
    }

    pub fn locator(&self) -> Option<&GraphicsLocator> {
        self.locator.as_ref()
    }

    pub(crate) fn set_locator(&mut self, locator: GraphicsLocator) {
        self.locator = Some(locator);
    }

    /// Draws one frame, silently doing nothing if it hasn't been decoded.
    pub fn draw(&self, surface: &mut Surface, frame: u32, group: u32, x: i32, y: i32) {
        if let Some(sprite) = self.frame(group, frame) {
            sprite.draw(surface, x, y, None);
        }
    }

    fn for_each_frame(&mut self, mut f: impl FnMut(&mut DecodedSprite)) {
        let scope = self.scope;
        for (_, frames) in self.frames.iter_mut().filter(|(group, _)| scope.includes(**group)) {
            for frame in frames.iter_mut() {
                f(Arc::make_mut(frame));
            }
        }
    }

    /// Recolors every loaded frame (of every group or of the one loaded group).
    pub fn recolor_to_owner(&mut self, owner: u8, palettes: &PlayerPalettes) {
        self.for_each_frame(|frame| frame.recolor_to_owner(owner, palettes));
    }

    pub fn set_glow(&mut self, kind: GlowKind, intensity: u8) {
        self.for_each_frame(|frame| frame.set_glow(kind, intensity));
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.for_each_frame(|frame| frame.set_alpha(alpha));
    }

    pub fn set_flip(&mut self, flip: Flip) {
        self.for_each_frame(|frame| frame.set_flip(flip));
    }
}
