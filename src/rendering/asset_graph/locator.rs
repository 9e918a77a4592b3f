use std::fmt::{Display, Formatter};

use crate::io::common::resource_id::ResourceLocator;

/// Selects a variant of a decoded resource. Unset fields mean "the base decode": the first
/// frame of the first group and the palette as stored.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct FrameSelector {
    pub group: Option<u32>,
    pub frame: Option<u32>,
    pub owner: Option<u8>,
}

impl FrameSelector {
    pub fn frame(group: u32, frame: u32) -> Self {
        Self {
            group: Some(group),
            frame: Some(frame),
            owner: None,
        }
    }

    pub fn group(group: u32) -> Self {
        Self {
            group: Some(group),
            ..Default::default()
        }
    }

    pub fn with_owner(self, owner: u8) -> Self {
        Self {
            owner: Some(owner),
            ..self
        }
    }

    /// The same selection without the recolor
    pub fn untransformed(&self) -> Self {
        Self { owner: None, ..*self }
    }

    /// Spells out what gets decoded, so equivalent selections share one cache entry: sheets
    /// default to group 0 frame 0, bitmaps have neither.
    pub fn resolved(&self, is_sheet: bool) -> Self {
        if is_sheet {
            Self {
                group: Some(self.group.unwrap_or(0)),
                frame: Some(self.frame.unwrap_or(0)),
                owner: self.owner,
            }
        } else {
            Self {
                group: None,
                frame: None,
                owner: self.owner,
            }
        }
    }
}

/// Cache key of a decoded and possibly transformed image or animation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphicsLocator {
    pub locator: ResourceLocator,
    pub selector: FrameSelector,
}

impl GraphicsLocator {
    pub fn new(locator: ResourceLocator, selector: FrameSelector) -> Self {
        Self { locator, selector }
    }

    pub fn with_selector(&self, selector: FrameSelector) -> Self {
        Self {
            locator: self.locator.clone(),
            selector,
        }
    }
}

impl Display for GraphicsLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.locator)?;
        if let Some(group) = self.selector.group {
            write!(f, " group {}", group)?;
        }
        if let Some(frame) = self.selector.frame {
            write!(f, " frame {}", frame)?;
        }
        if let Some(owner) = self.selector.owner {
            write!(f, " owner {}", owner)?;
        }
        Ok(())
    }
}
