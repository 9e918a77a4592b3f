use lodrust_files::common::types::Color;

use crate::io::error::ResourceError;

/// Palette indices 224..=255 carry the owner's flag color.
pub const PLAYER_BAND_START: usize = 224;
pub const PLAYER_BAND_SIZE: usize = 32;
pub const PLAYER_LIMIT: u8 = 8;

/// Palette indices that are blended for the glow overlay (selection highlight and the shadow
/// below it on creature sheets).
pub const GLOW_INDICES: [u8; 3] = [5, 6, 7];

const FLAG_COLORS: [(u8, u8, u8); PLAYER_LIMIT as usize] = [
    (255, 0, 0),     // red
    (49, 82, 255),   // blue
    (156, 115, 82),  // tan
    (66, 148, 41),   // green
    (255, 132, 0),   // orange
    (140, 41, 165),  // purple
    (8, 156, 165),   // teal
    (198, 123, 140), // pink
];
const NEUTRAL_COLOR: (u8, u8, u8) = (132, 132, 132);

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum GlowKind {
    #[default]
    None,
    Yellow,
    Blue,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    pub fn horizontal(&self) -> bool {
        matches!(self, Flip::Horizontal | Flip::Both)
    }

    pub fn vertical(&self) -> bool {
        matches!(self, Flip::Vertical | Flip::Both)
    }
}

pub type ColorBand = [Color; PLAYER_BAND_SIZE];

/// The 32 color ramps that replace the player band of a palette, one per player plus the neutral one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPalettes {
    players: [ColorBand; PLAYER_LIMIT as usize],
    neutral: ColorBand,
}

fn ramp((r, g, b): (u8, u8, u8)) -> ColorBand {
    let mut band = [Color::TRANSPARENT; PLAYER_BAND_SIZE];
    for (i, color) in band.iter_mut().enumerate() {
        // from a quarter of the brightness up to the full flag color
        let scale = |c: u8| (c as usize * (PLAYER_BAND_SIZE + 3 * i) / (4 * PLAYER_BAND_SIZE - 3)) as u8;
        *color = Color::opaque(scale(r), scale(g), scale(b));
    }
    band
}

fn band_from_rgb(data: &[u8]) -> ColorBand {
    let mut band = [Color::TRANSPARENT; PLAYER_BAND_SIZE];
    for (color, rgb) in band.iter_mut().zip(data.chunks_exact(3)) {
        *color = Color::opaque(rgb[0], rgb[1], rgb[2]);
    }
    band
}

impl PlayerPalettes {
    /// `players` is the game's `PLAYERS.PAL` (8 x 32 RGB triplets), `neutral` its `NEUTRAL.PAL`
    /// (at least 32 RGB triplets).
    pub fn from_pal_bytes(players: &[u8], neutral: &[u8]) -> Result<Self, ResourceError> {
        let band_len = PLAYER_BAND_SIZE * 3;
        if players.len() < band_len * PLAYER_LIMIT as usize {
            return Err(ResourceError::corrupt(
                "player palette",
                format!("{} bytes are too short", players.len()),
            ));
        }
        if neutral.len() < band_len {
            return Err(ResourceError::corrupt(
                "neutral palette",
                format!("{} bytes are too short", neutral.len()),
            ));
        }

        let mut bands = [[Color::TRANSPARENT; PLAYER_BAND_SIZE]; PLAYER_LIMIT as usize];
        for (band, data) in bands.iter_mut().zip(players.chunks_exact(band_len)) {
            *band = band_from_rgb(data);
        }

        Ok(Self {
            players: bands,
            neutral: band_from_rgb(&neutral[..band_len]),
        })
    }

    /// The band for `owner`, anything outside of the player range is neutral.
    pub fn band(&self, owner: u8) -> &ColorBand {
        self.players.get(owner as usize).unwrap_or(&self.neutral)
    }
}

impl Default for PlayerPalettes {
    fn default() -> Self {
        Self {
            players: FLAG_COLORS.map(ramp),
            neutral: ramp(NEUTRAL_COLOR),
        }
    }
}

#[inline]
fn lerp(from: u8, to: u8, amount: u8) -> u8 {
    let (from, to, amount) = (from as i32, to as i32, amount as i32);
    (from + (to - from) * amount / 255) as u8
}

/// The glow color for one palette slot, blended from its state at decode time.
pub fn glow_color(base: Color, kind: GlowKind, intensity: u8) -> Color {
    match kind {
        GlowKind::None => base,
        GlowKind::Yellow => Color::rgba(
            lerp(base.r, 255, intensity),
            lerp(base.g, 255, intensity),
            base.b,
            base.a.max(intensity),
        ),
        GlowKind::Blue => Color::rgba(
            base.r,
            lerp(base.g, 255, intensity / 2),
            lerp(base.b, 255, intensity),
            base.a.max(intensity),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_end_at_the_flag_color() {
        let palettes = PlayerPalettes::default();
        assert_eq!(palettes.band(0)[PLAYER_BAND_SIZE - 1], Color::opaque(255, 0, 0));
        assert_eq!(palettes.band(1)[PLAYER_BAND_SIZE - 1], Color::opaque(49, 82, 255));
        assert_eq!(palettes.band(8), palettes.band(255));
        assert_eq!(palettes.band(200)[PLAYER_BAND_SIZE - 1], Color::opaque(132, 132, 132));
        assert!(palettes.band(0)[0].r < 100);
    }

    #[test]
    fn palettes_from_files() -> Result<(), anyhow::Error> {
        let players: Vec<u8> = (0..768u32).map(|i| (i / 96) as u8).collect();
        let neutral = vec![7u8; 96];
        let palettes = PlayerPalettes::from_pal_bytes(&players, &neutral)?;
        assert_eq!(palettes.band(3)[10], Color::opaque(3, 3, 3));
        assert_eq!(palettes.band(9)[0], Color::opaque(7, 7, 7));

        assert!(PlayerPalettes::from_pal_bytes(&players[..700], &neutral).is_err());
        assert!(PlayerPalettes::from_pal_bytes(&players, &neutral[..10]).is_err());
        Ok(())
    }

    #[test]
    fn glow_blending() {
        let base = Color::rgba(0, 0, 0, 0);
        assert_eq!(glow_color(base, GlowKind::None, 200), base);
        assert_eq!(glow_color(base, GlowKind::Yellow, 255), Color::rgba(255, 255, 0, 255));
        assert_eq!(glow_color(base, GlowKind::Blue, 255), Color::rgba(0, 127, 255, 255));

        let shadow = Color::rgba(0, 0, 0, 192);
        assert_eq!(glow_color(shadow, GlowKind::Yellow, 0).a, 192);
    }
}
