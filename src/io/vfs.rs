use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use itertools::Itertools;
use log::{debug, trace, warn};

use crate::io::backend::ArchiveBackend;
use crate::io::common::loader::ResourceLoader;
use crate::io::common::resource_id::{
    BackendId, FileInfo, ResourceIdentifier, ResourceKind, ResourceLocator,
};
use crate::io::error::ResourceError;

/// Merges the catalogs of all registered backends into one table. Backends registered later
/// override the ones registered earlier; the full chain stays available for callers that want
/// the original asset.
///
/// Registration needs `&mut self`, so the table is complete before it is shared (usually as an
/// `Arc<VirtualFilesystem>`) and only read afterwards.
#[derive(Default)]
pub struct VirtualFilesystem {
    backends: Vec<ArchiveBackend>,
    /// identifier -> locators in registration order, never empty
    table: HashMap<ResourceIdentifier, Vec<ResourceLocator>>,
}

impl VirtualFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, backend: ArchiveBackend) -> BackendId {
        let id = BackendId(self.backends.len());
        let entries = backend.enumerate();
        debug!(
            "Registering {} with {} entries",
            backend.describe(),
            entries.len()
        );

        for entry in entries {
            self.table
                .entry(entry.identifier)
                .or_default()
                .push(ResourceLocator::new(id, entry.entry_name));
        }

        self.backends.push(backend);
        id
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    pub fn describe_backend(&self, id: BackendId) -> Option<&str> {
        self.backends.get(id.0).map(|backend| backend.describe())
    }

    pub fn contains(&self, identifier: &ResourceIdentifier) -> bool {
        self.table.contains_key(identifier)
    }

    /// The override chain of `identifier`, earliest first.
    pub fn locators(&self, identifier: &ResourceIdentifier) -> &[ResourceLocator] {
        self.table.get(identifier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The highest priority locator, or the original one when `use_earliest` is set.
    pub fn resolve(
        &self,
        identifier: &ResourceIdentifier,
        use_earliest: bool,
    ) -> Result<&ResourceLocator, ResourceError> {
        let chain = self.locators(identifier);
        let locator = if use_earliest { chain.first() } else { chain.last() };
        locator.ok_or_else(|| ResourceError::unknown_identifier(identifier))
    }

    fn backend(&self, locator: &ResourceLocator) -> Result<&ArchiveBackend, ResourceError> {
        self.backends.get(locator.backend.0).ok_or_else(|| {
            ResourceError::PreconditionViolated(format!("{} refers to an unknown backend", locator))
        })
    }

    pub fn fetch(&self, locator: &ResourceLocator) -> Result<Vec<u8>, ResourceError> {
        self.backend(locator)?.fetch(&locator.entry_name)
    }

    /// Last modification time of the entry, only known for loose files.
    pub fn modified(&self, locator: &ResourceLocator) -> Option<SystemTime> {
        self.backend(locator).ok()?.modified(&locator.entry_name)
    }

    pub fn fetch_identifier(
        &self,
        identifier: &ResourceIdentifier,
        use_earliest: bool,
    ) -> Result<Vec<u8>, ResourceError> {
        let locator = self.resolve(identifier, use_earliest)?;
        trace!("{} resolved to {}", identifier, locator);
        self.fetch(locator)
    }

    /// Text resources are mostly Windows-1252, anything outside of ASCII is replaced.
    pub fn fetch_as_string(
        &self,
        identifier: &ResourceIdentifier,
        use_earliest: bool,
    ) -> Result<String, ResourceError> {
        let bytes = self.fetch_identifier(identifier, use_earliest)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Maps and campaigns are gzip files. Resources that aren't compressed are returned as they
    /// are, a broken gzip stream is `Corrupt`.
    pub fn fetch_unpacked(
        &self,
        identifier: &ResourceIdentifier,
        use_earliest: bool,
    ) -> Result<Vec<u8>, ResourceError> {
        let bytes = self.fetch_identifier(identifier, use_earliest)?;
        lod::gunzip(&bytes).map_err(|e| ResourceError::from_io(identifier.to_string(), e))
    }

    /// All resources of `kind` whose name starts with `prefix` (e.g. every map below `MAPS/`),
    /// each with its highest priority locator, sorted by name.
    pub fn files_with_prefix(&self, prefix: &str, kind: Option<ResourceKind>) -> Vec<FileInfo> {
        let prefix = prefix.replace('\\', "/").to_ascii_uppercase();
        self.table
            .iter()
            .filter(|(identifier, _)| kind.is_none_or(|kind| identifier.kind() == kind))
            .filter(|(identifier, _)| identifier.name().starts_with(&prefix))
            .filter_map(|(identifier, chain)| {
                chain.last().map(|locator| FileInfo {
                    identifier: identifier.clone(),
                    locator: locator.clone(),
                    modified: self.modified(locator),
                })
            })
            .sorted_by(|a, b| {
                a.identifier
                    .name()
                    .cmp(b.identifier.name())
                    .then(a.identifier.kind().cmp(&b.identifier.kind()))
            })
            .collect_vec()
    }

    /// Writes the raw bytes of a resource to `destination`. Debugging aid only.
    pub fn dump<P: AsRef<Path>>(
        &self,
        identifier: &ResourceIdentifier,
        use_earliest: bool,
        destination: P,
    ) -> Result<usize, ResourceError> {
        let bytes = self.fetch_identifier(identifier, use_earliest).inspect_err(|e| {
            warn!("Cannot dump {}: {}", identifier, e);
        })?;
        fs::write(destination.as_ref(), &bytes)?;
        Ok(bytes.len())
    }
}
