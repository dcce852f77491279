//! # Creation Extras
//!
//! A keyed property bag used to pass subtype-specific values through generic
//! factories. Keys are closed enums defined by the consuming crate (one
//! variant per declared field), so the container only ever holds genuine
//! declared properties and there is no string or hash-based key lookup.
//!
//! Required lookups fail fast with [`MissingCreationExtra`]; optional
//! lookups return `None`.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::MissingCreationExtra;

/// An ordered map from field identifier to value.
#[derive(Clone, PartialEq, Eq)]
pub struct CreationExtras<K: Ord, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord + Copy + fmt::Display, V> CreationExtras<K, V> {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Set `key` to `value`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<K>, value: impl Into<V>) -> Option<V> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<K>, value: impl Into<V>) -> Self {
        self.insert(key, value);
        self
    }

    /// Required lookup.
    pub fn get(&self, key: impl Into<K>) -> Result<&V, MissingCreationExtra> {
        let key = key.into();
        self.entries
            .get(&key)
            .ok_or_else(|| MissingCreationExtra::new(key.to_string()))
    }

    /// Optional lookup.
    pub fn get_or_none(&self, key: impl Into<K>) -> Option<&V> {
        self.entries.get(&key.into())
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: impl Into<K>) -> Option<V> {
        self.entries.remove(&key.into())
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: impl Into<K>) -> bool {
        self.entries.contains_key(&key.into())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

impl<K: Ord + Copy + fmt::Display, V: Clone> CreationExtras<K, V> {
    /// Duplicate the container so one base set of extras can seed several
    /// credentials; later inserts on either copy do not affect the other.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

impl<K: Ord + Copy + fmt::Display, V> Default for CreationExtras<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for CreationExtras<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Ord + Copy + fmt::Display, V> FromIterator<(K, V)> for CreationExtras<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Key {
        Start,
        End,
    }

    impl fmt::Display for Key {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Key::Start => f.write_str("tStart"),
                Key::End => f.write_str("tEnd"),
            }
        }
    }

    #[test]
    fn test_required_get_fails_when_absent() {
        let extras: CreationExtras<Key, u64> = CreationExtras::new();
        let err = extras.get(Key::Start).unwrap_err();
        assert_eq!(err.field, "tStart");
    }

    #[test]
    fn test_get_or_none() {
        let extras = CreationExtras::<Key, u64>::new().with(Key::End, 9u64);
        assert_eq!(extras.get_or_none(Key::End), Some(&9));
        assert_eq!(extras.get_or_none(Key::Start), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut extras = CreationExtras::<Key, u64>::new();
        assert_eq!(extras.insert(Key::Start, 1u64), None);
        assert_eq!(extras.insert(Key::Start, 2u64), Some(1));
        assert_eq!(*extras.get(Key::Start).unwrap(), 2);
        assert_eq!(extras.len(), 1);
    }

    #[test]
    fn test_copy_is_independent() {
        let base = CreationExtras::<Key, u64>::new().with(Key::Start, 1u64);
        let mut copy = base.copy();
        copy.insert(Key::End, 2u64);
        assert!(!base.contains(Key::End));
        assert!(copy.contains(Key::End));
        assert!(copy.contains(Key::Start));
    }

    #[test]
    fn test_remove_and_empty() {
        let mut extras = CreationExtras::<Key, u64>::new().with(Key::Start, 1u64);
        assert_eq!(extras.remove(Key::Start), Some(1));
        assert!(extras.is_empty());
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let extras: CreationExtras<Key, u64> =
            vec![(Key::End, 2), (Key::Start, 1)].into_iter().collect();
        let keys: Vec<Key> = extras.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![Key::Start, Key::End]);
    }
}
