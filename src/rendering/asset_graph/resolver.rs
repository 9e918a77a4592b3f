use std::sync::Arc;

use log::trace;

use crate::io::error::ResourceError;
use crate::rendering::animation::Animation;
use crate::rendering::asset_graph::locator::GraphicsLocator;
use crate::rendering::image::DecodedSprite;
use crate::util::weak_dashmap::WeakValueDashMap;

/// Values that can live in a [`Resolver`]. They know the key they are cached under, so that a
/// transform can move them to their new key.
pub trait CachedAsset: Clone + Send + Sync {
    fn locator(&self) -> Option<&GraphicsLocator>;

    fn relocate(&mut self, locator: GraphicsLocator);
}

impl CachedAsset for DecodedSprite {
    fn locator(&self) -> Option<&GraphicsLocator> {
        DecodedSprite::locator(self)
    }

    fn relocate(&mut self, locator: GraphicsLocator) {
        self.set_locator(locator)
    }
}

impl CachedAsset for Animation {
    fn locator(&self) -> Option<&GraphicsLocator> {
        Animation::locator(self)
    }

    fn relocate(&mut self, locator: GraphicsLocator) {
        self.set_locator(locator)
    }
}

/// Deduplicates decoded assets without owning them: the cache only holds weak references, a value
/// lives as long as somebody outside holds it and is decoded again when requested afterwards.
pub struct Resolver<T: CachedAsset> {
    ref_cache: WeakValueDashMap<GraphicsLocator, T>,
}

impl<T: CachedAsset> Default for Resolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CachedAsset> Resolver<T> {
    pub fn new() -> Self {
        Self {
            ref_cache: WeakValueDashMap::with_capacity(100),
        }
    }

    /// The live value under `key`, if any
    pub fn get(&self, key: &GraphicsLocator) -> Option<Arc<T>> {
        self.ref_cache.get(key)
    }

    pub fn is_live(&self, key: &GraphicsLocator) -> bool {
        self.ref_cache.contains_live(key)
    }

    /// Returns the live value under `key` or caches what `generator` produces. Concurrent callers
    /// for the same key wait for one generator instead of decoding twice.
    pub fn get_or_generate<F>(&self, key: &GraphicsLocator, generator: F) -> Result<Arc<T>, ResourceError>
    where
        F: FnOnce(&GraphicsLocator) -> Result<T, ResourceError>,
    {
        if let Some(value) = self.ref_cache.get(key) {
            trace!("Cache hit for {}", key);
            return Ok(value);
        }

        self.ref_cache.get_or_try_insert_with(key.clone(), || {
            let mut value = generator(key)?;
            value.relocate(key.clone());
            Ok(Arc::new(value))
        })
    }

    /// Whether exactly one strong reference to the value under `key` exists. Asking for a key
    /// that isn't live is a usage error.
    pub fn is_unique(&self, key: &GraphicsLocator) -> Result<bool, ResourceError> {
        self.ref_cache
            .strong_count(key)
            .map(|count| count == 1)
            .ok_or_else(|| ResourceError::PreconditionViolated(format!("{} is not cached", key)))
    }

    /// Copy-on-write: returns the value cached under `new_key` if there is one. Otherwise `source`
    /// is transformed in place and moved to `new_key` when the caller held the only reference
    /// (its old key becomes vacant), or a transformed clone is cached under `new_key` while the
    /// original stays untouched under its key.
    pub fn get_transformed<F>(&self, source: Arc<T>, transform: F, new_key: &GraphicsLocator) -> Arc<T>
    where
        F: FnOnce(&mut T),
    {
        if let Some(value) = self.ref_cache.get(new_key) {
            trace!("Cache hit for transformed {}", new_key);
            return value;
        }

        // Arc::get_mut also refuses while weak references exist, so drop the cache's first
        let vacated = source
            .locator()
            .cloned()
            .filter(|old_key| Arc::strong_count(&source) == 1 && self.ref_cache.remove_value(old_key, &source));

        let mut source = source;

        let value = match Arc::get_mut(&mut source) {
            Some(value) => {
                trace!("Transforming {} in place", new_key);
                transform(value);
                value.relocate(new_key.clone());
                source
            }
            None => {
                // somebody upgraded the source in the meantime, it has to stay available
                if let Some(old_key) = vacated {
                    self.ref_cache.insert_if_absent(old_key, source.clone());
                }
                trace!("Transforming a copy for {}", new_key);
                let mut value = T::clone(&source);
                transform(&mut value);
                value.relocate(new_key.clone());
                Arc::new(value)
            }
        };

        // maybe we have been raced
        self.ref_cache.insert_if_absent(new_key.clone(), value)
    }

    /// Number of slots, expired ones included until they are pruned
    pub fn len(&self) -> usize {
        self.ref_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ref_cache.is_empty()
    }

    pub fn live_keys(&self) -> Vec<GraphicsLocator> {
        self.ref_cache.live_keys()
    }
}
