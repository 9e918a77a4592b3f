use std::time::SystemTime;

use crate::io::common::resource_id::ResourceIdentifier;
use crate::io::error::ResourceError;

/// One entry a backend reports when it is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedEntry {
    /// The name inside the backend, as it has to be passed to [`ResourceLoader::fetch`]
    pub entry_name: String,
    pub identifier: ResourceIdentifier,
}

impl EnumeratedEntry {
    pub fn new(prefix: &str, entry_name: &str) -> Self {
        Self {
            entry_name: entry_name.to_string(),
            identifier: ResourceIdentifier::from_entry(prefix, entry_name),
        }
    }
}

/// A physical store of resources. `enumerate` is called once, when the backend is registered,
/// `fetch` may be called from any thread afterwards.
pub trait ResourceLoader: Send + Sync {
    fn enumerate(&self) -> Vec<EnumeratedEntry>;

    fn fetch(&self, entry_name: &str) -> Result<Vec<u8>, ResourceError>;

    /// Last modification time of an entry. Archives don't record one.
    fn modified(&self, _entry_name: &str) -> Option<SystemTime> {
        None
    }

    /// Human readable origin, used for logging
    fn describe(&self) -> &str;
}
