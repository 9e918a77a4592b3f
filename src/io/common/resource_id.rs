use std::fmt::{Display, Formatter};
use std::time::SystemTime;

/// What a resource is, derived from its file extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Text,
    Animation,
    Mask,
    Campaign,
    Map,
    Font,
    Graphics,
    Video,
    Sound,
    SaveGame,
    Other,
}

impl ResourceKind {
    /// Accepts the extension with or without the leading dot, in any case.
    pub fn from_extension(extension: &str) -> ResourceKind {
        let extension = extension.trim_start_matches('.').to_ascii_uppercase();
        match extension.as_str() {
            "TXT" | "JSON" => ResourceKind::Text,
            "DEF" => ResourceKind::Animation,
            "MSK" | "MSG" => ResourceKind::Mask,
            "H3C" => ResourceKind::Campaign,
            "H3M" => ResourceKind::Map,
            "FNT" => ResourceKind::Font,
            "BMP" | "JPG" | "PCX" | "PNG" | "TGA" => ResourceKind::Graphics,
            "WAV" => ResourceKind::Sound,
            "SMK" | "BIK" => ResourceKind::Video,
            "GM1" => ResourceKind::SaveGame,
            _ => ResourceKind::Other,
        }
    }

    pub fn from_name(name: &str) -> Option<ResourceKind> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "text" => ResourceKind::Text,
            "animation" => ResourceKind::Animation,
            "mask" => ResourceKind::Mask,
            "campaign" => ResourceKind::Campaign,
            "map" => ResourceKind::Map,
            "font" => ResourceKind::Font,
            "graphics" => ResourceKind::Graphics,
            "video" => ResourceKind::Video,
            "sound" => ResourceKind::Sound,
            "savegame" => ResourceKind::SaveGame,
            "other" => ResourceKind::Other,
            _ => return None,
        };
        Some(kind)
    }
}

/// Splits a raw entry name into the uppercase stem and the uppercase extension (including the dot).
/// Backslashes are treated as path separators and the extension is only split off when the last dot
/// belongs to the file name, not to a directory.
pub fn adapt_resource_name(raw: &str) -> (String, String) {
    let name = raw.replace('\\', "/").to_ascii_uppercase();
    match name.rfind(['/', '.']) {
        Some(pos) if name.as_bytes()[pos] == b'.' => (name[..pos].to_string(), name[pos..].to_string()),
        _ => (name, String::new()),
    }
}

/// The logical identity of an asset, independent of where it is stored. Names are uppercase and
/// carry no extension, so that e.g. a `.PNG` from a mod overrides the original `.PCX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    name: String,
    kind: ResourceKind,
}

impl ResourceIdentifier {
    pub fn new(name: &str, kind: ResourceKind) -> Self {
        Self {
            name: name.replace('\\', "/").to_ascii_uppercase(),
            kind,
        }
    }

    /// Builds the identifier for an entry `name` (with extension) of a backend mounted at `prefix`.
    pub fn from_entry(prefix: &str, name: &str) -> Self {
        let (stem, extension) = adapt_resource_name(name);
        Self::new(
            &format!("{}{}", prefix, stem),
            ResourceKind::from_extension(&extension),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Display for ResourceIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.name, self.kind)
    }
}

/// Index of a backend in the order of registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(pub(crate) usize);

impl BackendId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One physical occurrence of a resource: the backend it lives in and the name of the entry there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceLocator {
    pub backend: BackendId,
    pub entry_name: String,
}

impl ResourceLocator {
    pub fn new(backend: BackendId, entry_name: impl Into<String>) -> Self {
        Self {
            backend,
            entry_name: entry_name.into(),
        }
    }

    /// Uppercase extension with the dot, e.g. `.DEF`
    pub fn extension(&self) -> String {
        adapt_resource_name(&self.entry_name).1
    }
}

impl Display for ResourceLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.entry_name, self.backend.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub identifier: ResourceIdentifier,
    pub locator: ResourceLocator,
    /// Only known for loose files
    pub modified: Option<SystemTime>,
}

impl FileInfo {
    /// Original entry name, e.g. `Maps/Arrogance.h3m`
    pub fn name(&self) -> &str {
        &self.locator.entry_name
    }

    /// Uppercase, e.g. `.H3M`
    pub fn extension(&self) -> String {
        self.locator.extension()
    }

    /// File name without directories and extension, e.g. `ARROGANCE`
    pub fn stem(&self) -> &str {
        let name = self.identifier.name();
        name.rsplit('/').next().unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(ResourceKind::from_extension(".def"), ResourceKind::Animation);
        assert_eq!(ResourceKind::from_extension("PCX"), ResourceKind::Graphics);
        assert_eq!(ResourceKind::from_extension(".Json"), ResourceKind::Text);
        assert_eq!(ResourceKind::from_extension(".smk"), ResourceKind::Video);
        assert_eq!(ResourceKind::from_extension(".xyz"), ResourceKind::Other);
        assert_eq!(ResourceKind::from_extension(""), ResourceKind::Other);
    }

    #[test]
    fn name_adaption() {
        assert_eq!(
            adapt_resource_name("Sprites/avwangl.def"),
            ("SPRITES/AVWANGL".to_string(), ".DEF".to_string())
        );
        assert_eq!(
            adapt_resource_name("mods\\v1.2/README"),
            ("MODS/V1.2/README".to_string(), String::new())
        );
        assert_eq!(
            adapt_resource_name("archive.tar.gz"),
            ("ARCHIVE.TAR".to_string(), ".GZ".to_string())
        );
    }

    #[test]
    fn identifiers_are_structural() {
        let a = ResourceIdentifier::new("data/town", ResourceKind::Graphics);
        let b = ResourceIdentifier::from_entry("DATA/", "Town.pcx");
        assert_eq!(a, b);
        assert_eq!(b.name(), "DATA/TOWN");

        let text = ResourceIdentifier::from_entry("DATA/", "TOWN.TXT");
        assert_ne!(a, text);
    }

    #[test]
    fn file_info_parts() {
        let info = FileInfo {
            identifier: ResourceIdentifier::from_entry("MAPS/", "Campaigns/Arrogance.h3m"),
            locator: ResourceLocator::new(BackendId(0), "Campaigns/Arrogance.h3m"),
            modified: None,
        };
        assert_eq!(info.stem(), "ARROGANCE");
        assert_eq!(info.extension(), ".H3M");
    }
}
