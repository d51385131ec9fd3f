//! Core ordered map implementation.
//!
//! [`OrderedMap`] keeps three co-indexed structures in step:
//! - `sequence`: values in insertion order
//! - `position_of`: key to index into `sequence`
//! - `key_at`: index to key, the inverse of `position_of`
//!
//! The structures live behind an [`Arc`]. Cloning a map only bumps the reference
//! count; the first mutation on a shared handle deep-clones the indices before
//! touching them, so other holders keep seeing their own version.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::iter::{FusedIterator, Zip};
use std::slice;
use std::sync::Arc;

use tracing::{debug, error, trace};

use super::errors::MapError;
use crate::Result;

/// The three co-indexed structures backing a map version.
#[derive(Clone)]
struct Indices<K, V> {
    sequence: Vec<V>,
    position_of: HashMap<K, usize>,
    key_at: Vec<K>,
}

impl<K, V> Default for Indices<K, V> {
    fn default() -> Self {
        Self {
            sequence: Vec::new(),
            position_of: HashMap::new(),
            key_at: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> Indices<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            sequence: Vec::with_capacity(capacity),
            position_of: HashMap::with_capacity(capacity),
            key_at: Vec::with_capacity(capacity),
        }
    }

    /// Appends an entry at the tail. The key must not be present.
    fn push(&mut self, key: K, value: V) -> usize {
        let index = self.sequence.len();
        self.sequence.push(value);
        self.position_of.insert(key.clone(), index);
        self.key_at.push(key);
        index
    }

    /// Removes `key` and closes the gap it leaves.
    ///
    /// Every entry after the removed slot moves down by one, and its
    /// `position_of` entry is rewritten in the same pass.
    fn remove<Q>(&mut self, key: &Q) -> Option<(usize, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.position_of.remove(key)?;
        let value = self.sequence.remove(index);
        self.key_at.remove(index);

        for (position, shifted) in self.key_at.iter().enumerate().skip(index) {
            if let Some(slot) = self.position_of.get_mut::<K>(shifted) {
                *slot = position;
            }
        }

        Some((index, value))
    }
}

/// An insertion-ordered map with copy-on-write versions.
///
/// `OrderedMap` behaves like a key/value mapping with two extra rules:
/// iteration follows the order in which keys were first inserted, and inserting
/// a key that is already present fails instead of overwriting.
///
/// # Versions
///
/// Every mutation yields a new logical version. The persistent methods
/// ([`set`](Self::set), [`delete`](Self::delete)) leave `self` untouched and return
/// the new version. The in-place methods ([`insert`](Self::insert),
/// [`remove`](Self::remove)) update the handle they are called on, but still never
/// affect clones taken earlier.
///
/// ```
/// use orderedmap::OrderedMap;
///
/// let v1 = OrderedMap::new().must_set("a", 1);
/// let v2 = v1.set("b", 2).unwrap();
/// let v3 = v2.delete("a");
///
/// assert_eq!(v1.len(), 1);
/// assert_eq!(v2.keys().copied().collect::<Vec<_>>(), ["a", "b"]);
/// assert_eq!(v3.keys().copied().collect::<Vec<_>>(), ["b"]);
/// ```
///
/// # Zero value
///
/// [`OrderedMap::default`] allocates nothing. Reads on it report an empty map, and
/// the indices are created by the first insert.
///
/// # Threads
///
/// There is no internal locking. A handle is `Send`/`Sync` when `K` and `V` are,
/// and mutation always goes through `&mut self` (or an owned value).
pub struct OrderedMap<K, V> {
    indices: Option<Arc<Indices<K, V>>>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self { indices: None }
    }
}

impl<K, V> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            indices: self.indices.clone(),
        }
    }
}

impl<K, V> OrderedMap<K, V> {
    /// Creates a new empty map
    pub fn new() -> Self {
        Self {
            indices: Some(Arc::new(Indices::default())),
        }
    }

    /// Returns the number of entries in the map
    pub fn len(&self) -> usize {
        self.indices
            .as_deref()
            .map_or(0, |indices| indices.sequence.len())
    }

    /// Returns true if the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entry at `index` in insertion order
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        let indices = self.indices.as_deref()?;
        Some((indices.key_at.get(index)?, indices.sequence.get(index)?))
    }

    /// Returns an iterator over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> Iter<'_, K, V> {
        let (keys, values) = self.slices();
        Iter {
            inner: keys.iter().zip(values.iter()),
        }
    }

    /// Returns an iterator over the keys in insertion order
    pub fn keys(&self) -> slice::Iter<'_, K> {
        self.slices().0.iter()
    }

    /// Returns an iterator over the values in insertion order
    pub fn values(&self) -> slice::Iter<'_, V> {
        self.slices().1.iter()
    }

    /// Visits every entry in insertion order.
    ///
    /// The first error returned by `visit` stops the traversal and is handed back
    /// unchanged; entries after the failing one are not visited.
    ///
    /// ```
    /// use orderedmap::OrderedMap;
    ///
    /// let map = OrderedMap::new().must_set("a", 1).must_set("b", 2).must_set("c", 3);
    ///
    /// let mut seen = Vec::new();
    /// let result = map.for_each(|key, value| {
    ///     if *value == 2 {
    ///         return Err(format!("stopped at {key}"));
    ///     }
    ///     seen.push(*key);
    ///     Ok(())
    /// });
    ///
    /// assert_eq!(result, Err("stopped at b".to_string()));
    /// assert_eq!(seen, ["a"]);
    /// ```
    pub fn for_each<E, F>(&self, mut visit: F) -> std::result::Result<(), E>
    where
        F: FnMut(&K, &V) -> std::result::Result<(), E>,
    {
        for (key, value) in self {
            visit(key, value)?;
        }
        Ok(())
    }

    fn slices(&self) -> (&[K], &[V]) {
        match self.indices.as_deref() {
            Some(indices) => (indices.key_at.as_slice(), indices.sequence.as_slice()),
            None => Default::default(),
        }
    }
}

impl<K: Hash + Eq, V> OrderedMap<K, V> {
    /// Returns true if `key` is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(key).is_some()
    }

    /// Returns the insertion-order position of `key`
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.indices.as_deref()?.position_of.get(key).copied()
    }

    /// Returns a reference to the value stored for `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let indices = self.indices.as_deref()?;
        let index = *indices.position_of.get(key)?;
        indices.sequence.get(index)
    }

    /// Returns the value stored for `key`, or `V::default()` when it is absent.
    ///
    /// An absent key and a key holding the default value look the same here; use
    /// [`contains_key`](Self::contains_key) to tell them apart.
    pub fn get_or_default<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Default + Clone,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Builds an unordered `HashMap` holding the same entries
    pub fn to_unordered(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let mut unordered = HashMap::with_capacity(self.len());
        let Ok(()) = self.for_each(|key, value| {
            unordered.insert(key.clone(), value.clone());
            Ok::<(), std::convert::Infallible>(())
        });
        unordered
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    /// Creates an empty map with room for `capacity` entries in every index
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Some(Arc::new(Indices::with_capacity(capacity))),
        }
    }

    /// Returns a new version with `key` appended, leaving `self` unchanged.
    ///
    /// Fails with [`MapError::KeyAlreadyExists`] if `key` is already present.
    pub fn set(&self, key: K, value: V) -> Result<Self> {
        let mut next = self.clone();
        next.insert(key, value)?;
        Ok(next)
    }

    /// Like [`set`](Self::set), but panics on a duplicate key.
    ///
    /// Meant for literal initialisation where a duplicate is a programming error.
    /// Consumes the handle so calls chain without copying.
    ///
    /// # Panics
    ///
    /// Panics if `key` is already present.
    pub fn must_set(mut self, key: K, value: V) -> Self {
        if let Err(err) = self.insert(key, value) {
            error!(error = %err, "must_set called with a duplicate key");
            panic!("{err}");
        }
        self
    }

    /// Appends `key` to this handle.
    ///
    /// Fails with [`MapError::KeyAlreadyExists`] if `key` is already present, in
    /// which case the map is left as it was.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        if self.contains_key(&key) {
            debug!(key = ?key, "Rejected insert of existing key");
            return Err(MapError::key_already_exists(&key).into());
        }

        let index = self.indices_mut().push(key, value);
        trace!(index, "Inserted entry");
        Ok(())
    }

    /// Returns a new version without `key`, leaving `self` unchanged.
    ///
    /// Deleting an absent key returns an identical version.
    pub fn delete<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut next = self.clone();
        next.remove(key);
        next
    }

    /// Removes `key` from this handle and returns its value.
    ///
    /// Later entries keep their relative order. This is O(n) in the number of
    /// entries after the removed one.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(key) {
            return None;
        }

        let indices = self.indices_mut();
        let (index, value) = indices.remove(key)?;
        trace!(
            index,
            shifted = indices.sequence.len() - index,
            "Removed entry"
        );
        Some(value)
    }

    /// Returns the indices for mutation, creating or detaching them first.
    fn indices_mut(&mut self) -> &mut Indices<K, V> {
        let indices = self
            .indices
            .get_or_insert_with(|| Arc::new(Indices::default()));
        if Arc::strong_count(indices) > 1 {
            debug!(
                len = indices.sequence.len(),
                "Copying shared ordered map before mutation"
            );
        }
        Arc::make_mut(indices)
    }
}

#[cfg(any(test, feature = "testing"))]
impl<K: Hash + Eq + Debug, V> OrderedMap<K, V> {
    /// Asserts that the internal indices agree with each other.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ or if `position_of` and `key_at` are not
    /// exact inverses.
    pub fn check_invariants(&self) {
        let Some(indices) = self.indices.as_deref() else {
            return;
        };

        assert_eq!(
            indices.sequence.len(),
            indices.position_of.len(),
            "sequence and position_of disagree on length"
        );
        assert_eq!(
            indices.sequence.len(),
            indices.key_at.len(),
            "sequence and key_at disagree on length"
        );
        for (position, key) in indices.key_at.iter().enumerate() {
            assert_eq!(
                indices.position_of.get(key),
                Some(&position),
                "key {key:?} is not indexed at position {position}"
            );
        }
    }

    /// Returns true if both handles point at the same stored version
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        match (&self.indices, &other.indices) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns true if the indices have not been created yet
    pub fn is_uninitialized(&self) -> bool {
        self.indices.is_none()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: Debug, V: Debug> Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over the entries of an [`OrderedMap`], in insertion order.
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    inner: Zip<slice::Iter<'a, K>, slice::Iter<'a, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
