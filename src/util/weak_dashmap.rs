use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use itertools::Itertools;

/// A concurrent hash map that only holds `Weak<V>` values, so entries don't keep their values
/// alive. Expired entries are treated as absent and pruned lazily: whenever the map would have to
/// grow on the next insert. Compare it to https://docs.rs/weak-table/latest/weak_table/, but based
/// on DashMap to allow for interior mutability.
pub struct WeakValueDashMap<K: Eq + Hash, V> {
    inner: DashMap<K, Weak<V>>,
}

impl<K: Eq + Hash, V> WeakValueDashMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: DashMap::with_capacity(capacity),
        }
    }

    /// Upgrades the entry, `None` when it is absent or expired.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key).and_then(|weak| weak.upgrade())
    }

    #[inline]
    pub fn contains_live<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key).is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Strong references of the live value, `None` when it is absent or expired.
    #[inline]
    pub fn strong_count<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner
            .get(key)
            .map(|weak| weak.strong_count())
            .filter(|count| *count > 0)
    }

    /// Removes the entry for `key` only if it refers to `value`.
    pub fn remove_value<Q>(&self, key: &Q, value: &Arc<V>) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner
            .remove_if(key, |_, weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(value)))
            .is_some()
    }

    /// Stores `value` unless another live value is already stored under `key`, returns the one that
    /// ends up in the map.
    pub fn insert_if_absent(&self, key: K, value: Arc<V>) -> Arc<V> {
        self.try_prune();
        match self.inner.entry(key) {
            Entry::Occupied(mut occupied) => match occupied.get().upgrade() {
                Some(existing) => existing,
                None => {
                    occupied.insert(Arc::downgrade(&value));
                    value
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::downgrade(&value));
                value
            }
        }
    }

    /// Returns the live value for `key` or stores the one built by `compute`. The shard of `key`
    /// stays locked while `compute` runs, so concurrent callers for the same key compute only once.
    /// `compute` must not access this map.
    pub fn get_or_try_insert_with<F, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<Arc<V>, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        self.try_prune();
        match self.inner.entry(key) {
            Entry::Occupied(mut occupied) => {
                // maybe we have been raced
                if let Some(value) = occupied.get().upgrade() {
                    return Ok(value);
                }
                let value = compute()?;
                occupied.insert(Arc::downgrade(&value));
                Ok(value)
            }
            Entry::Vacant(vacant) => {
                let value = compute()?;
                vacant.insert(Arc::downgrade(&value));
                Ok(value)
            }
        }
    }

    /// Number of slots, including the expired ones that haven't been pruned yet.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    fn try_prune(&self) {
        // Would have to allocate after the next insert.
        if self.inner.capacity() == self.inner.len() {
            self.prune();
        }
    }

    pub fn prune(&self) {
        self.inner.retain(|_, weak| weak.strong_count() > 0);
    }
}

impl<K: Eq + Hash, V> Default for WeakValueDashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V> WeakValueDashMap<K, V> {
    pub fn live_keys(&self) -> Vec<K> {
        self.inner
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .map(|entry| entry.key().clone())
            .collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_with_their_values() {
        let map = WeakValueDashMap::new();
        let value = Arc::new(5);
        let stored = map.insert_if_absent("five", value.clone());
        assert!(Arc::ptr_eq(&value, &stored));
        drop(stored);
        assert!(map.contains_live("five"));
        assert_eq!(map.strong_count("five"), Some(1));

        let other = map.get("five").unwrap();
        assert!(Arc::ptr_eq(&value, &other));
        assert_eq!(map.strong_count("five"), Some(2));

        drop(value);
        drop(other);
        assert!(map.get("five").is_none());
        assert_eq!(map.strong_count("five"), None);
        assert_eq!(map.len(), 1);
        map.prune();
        assert!(map.is_empty());
    }

    #[test]
    fn live_values_are_not_replaced() {
        let map = WeakValueDashMap::new();
        let first = Arc::new("first");
        assert!(Arc::ptr_eq(&map.insert_if_absent(1, first.clone()), &first));
        let kept = map.insert_if_absent(1, Arc::new("second"));
        assert!(Arc::ptr_eq(&kept, &first));

        assert!(!map.remove_value(&1, &Arc::new("first")));
        assert!(map.remove_value(&1, &first));
        assert!(map.get(&1).is_none());
    }

    #[test]
    fn compute_only_when_expired() {
        let map: WeakValueDashMap<u32, String> = WeakValueDashMap::with_capacity(4);
        let first = map
            .get_or_try_insert_with(1, || Ok::<_, ()>(Arc::new("a".to_string())))
            .unwrap();
        let second = map
            .get_or_try_insert_with(1, || Ok::<_, ()>(Arc::new("b".to_string())))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        drop(first);
        drop(second);
        let third = map
            .get_or_try_insert_with(1, || Ok::<_, ()>(Arc::new("c".to_string())))
            .unwrap();
        assert_eq!(third.as_str(), "c");

        assert!(map.get_or_try_insert_with(2, || Err("broken")).is_err());
        assert!(!map.contains_live(&2));
        assert_eq!(map.live_keys(), vec![1]);
    }
}
