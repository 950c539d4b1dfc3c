//! Ordered sparse stores backing a matrix
//!
//! A store maps linear cell keys to values, keeps the keys ordered (the
//! merge-join and lane extraction depend on it), and knows how to flatten
//! itself into the persistence form. The backends form a closed set, named
//! by [`StoreTag`]; rehydration refuses anything outside that set.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::Zip;
use std::ops::Range;
use std::slice;

use keymat_core::validation;
use keymat_core::{MatrixError, Result, StoreTag};

/// Ordered map from linear cell key to value
#[derive(Debug, Clone)]
pub enum SparseStore {
    /// Tree-map backend, cheap random insert and remove
    BTree(BTreeMap<u32, f32>),
    /// Sorted parallel-vector backend, compact and cache-friendly
    Paired(PairedStore),
}

/// Sorted key vector with a value vector aligned by position
#[derive(Debug, Clone, Default)]
pub struct PairedStore {
    keys: Vec<u32>,
    values: Vec<f32>,
}

impl PairedStore {
    /// Positions of `span` inside the sorted key vector
    fn bounds(&self, span: &Range<u32>) -> (usize, usize) {
        let lo = self.keys.partition_point(|&k| k < span.start);
        let hi = self.keys.partition_point(|&k| k < span.end);
        (lo, hi)
    }
}

impl SparseStore {
    /// Create an empty store with the given backend
    pub fn with_tag(tag: StoreTag) -> Self {
        match tag {
            StoreTag::BTree => SparseStore::BTree(BTreeMap::new()),
            StoreTag::Paired => SparseStore::Paired(PairedStore::default()),
        }
    }

    /// Backend tag of this store
    pub fn tag(&self) -> StoreTag {
        match self {
            SparseStore::BTree(_) => StoreTag::BTree,
            SparseStore::Paired(_) => StoreTag::Paired,
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        match self {
            SparseStore::BTree(map) => map.len(),
            SparseStore::Paired(paired) => paired.keys.len(),
        }
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value stored under `key`
    pub fn get(&self, key: u32) -> Option<f32> {
        match self {
            SparseStore::BTree(map) => map.get(&key).copied(),
            SparseStore::Paired(paired) => paired
                .keys
                .binary_search(&key)
                .ok()
                .map(|position| paired.values[position]),
        }
    }

    /// Mutable handle to the value stored under `key`
    pub fn get_mut(&mut self, key: u32) -> Option<&mut f32> {
        match self {
            SparseStore::BTree(map) => map.get_mut(&key),
            SparseStore::Paired(paired) => match paired.keys.binary_search(&key) {
                Ok(position) => Some(&mut paired.values[position]),
                Err(_) => None,
            },
        }
    }

    /// Insert or overwrite, returning the previous value
    pub fn insert(&mut self, key: u32, value: f32) -> Option<f32> {
        match self {
            SparseStore::BTree(map) => map.insert(key, value),
            SparseStore::Paired(paired) => match paired.keys.binary_search(&key) {
                Ok(position) => Some(std::mem::replace(&mut paired.values[position], value)),
                Err(position) => {
                    paired.keys.insert(position, key);
                    paired.values.insert(position, value);
                    None
                }
            },
        }
    }

    /// Remove `key`, returning the stored value if it was present
    pub fn remove(&mut self, key: u32) -> Option<f32> {
        match self {
            SparseStore::BTree(map) => map.remove(&key),
            SparseStore::Paired(paired) => match paired.keys.binary_search(&key) {
                Ok(position) => {
                    paired.keys.remove(position);
                    Some(paired.values.remove(position))
                }
                Err(_) => None,
            },
        }
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        match self {
            SparseStore::BTree(map) => map.clear(),
            SparseStore::Paired(paired) => {
                paired.keys.clear();
                paired.values.clear();
            }
        }
    }

    /// All entries in ascending key order
    pub fn iter(&self) -> Entries<'_> {
        match self {
            SparseStore::BTree(map) => Entries::BTree(map.range::<u32, _>(..)),
            SparseStore::Paired(paired) => {
                Entries::Paired(paired.keys.iter().zip(paired.values.iter()))
            }
        }
    }

    /// Entries with keys inside `span`, in ascending key order
    pub fn range(&self, span: Range<u32>) -> Entries<'_> {
        match self {
            SparseStore::BTree(map) => Entries::BTree(map.range(span)),
            SparseStore::Paired(paired) => {
                let (lo, hi) = paired.bounds(&span);
                Entries::Paired(paired.keys[lo..hi].iter().zip(paired.values[lo..hi].iter()))
            }
        }
    }

    /// All entries with mutable values, in ascending key order
    pub fn iter_mut(&mut self) -> EntriesMut<'_> {
        match self {
            SparseStore::BTree(map) => EntriesMut::BTree(map.range_mut::<u32, _>(..)),
            SparseStore::Paired(paired) => {
                EntriesMut::Paired(paired.keys.iter().zip(paired.values.iter_mut()))
            }
        }
    }

    /// Entries inside `span` with mutable values
    pub fn range_mut(&mut self, span: Range<u32>) -> EntriesMut<'_> {
        match self {
            SparseStore::BTree(map) => EntriesMut::BTree(map.range_mut(span)),
            SparseStore::Paired(paired) => {
                let (lo, hi) = paired.bounds(&span);
                EntriesMut::Paired(
                    paired.keys[lo..hi]
                        .iter()
                        .zip(paired.values[lo..hi].iter_mut()),
                )
            }
        }
    }

    /// Number of entries with keys inside `span`
    pub fn range_len(&self, span: Range<u32>) -> usize {
        match self {
            SparseStore::BTree(map) => map.range(span).count(),
            SparseStore::Paired(paired) => {
                let (lo, hi) = paired.bounds(&span);
                hi - lo
            }
        }
    }

    /// Flatten into the persistence form, keys ascending
    pub fn flatten(&self) -> FlatStore {
        let mut keys = Vec::with_capacity(self.len());
        let mut values = Vec::with_capacity(self.len());
        for (key, value) in self.iter() {
            keys.push(key);
            values.push(value);
        }
        FlatStore {
            tag: self.tag(),
            keys,
            values,
        }
    }

    /// Rebuild a store from its flattened form
    ///
    /// The arrays are validated against `limit` (the matrix cell count)
    /// before any store is built; on error nothing is constructed.
    pub fn rehydrate(tag: StoreTag, keys: Vec<u32>, values: Vec<f32>, limit: usize) -> Result<Self> {
        validation::check_flat(&keys, &values, limit)?;
        Ok(match tag {
            StoreTag::BTree => SparseStore::BTree(keys.into_iter().zip(values).collect()),
            StoreTag::Paired => SparseStore::Paired(PairedStore { keys, values }),
        })
    }

    /// Rebuild from a raw tag byte, rejecting unknown backends
    pub fn rehydrate_raw(tag: u8, keys: Vec<u32>, values: Vec<f32>, limit: usize) -> Result<Self> {
        let tag = StoreTag::from_u8(tag).ok_or(MatrixError::UnknownStoreTag)?;
        Self::rehydrate(tag, keys, values, limit)
    }
}

impl Default for SparseStore {
    fn default() -> Self {
        SparseStore::with_tag(StoreTag::BTree)
    }
}

/// Equality is content-based: two stores with the same entries compare
/// equal regardless of backend.
impl PartialEq for SparseStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

/// Ordered read iterator over store entries
pub enum Entries<'a> {
    /// Tree-map range
    BTree(btree_map::Range<'a, u32, f32>),
    /// Zipped key/value slices
    Paired(Zip<slice::Iter<'a, u32>, slice::Iter<'a, f32>>),
}

impl<'a> Iterator for Entries<'a> {
    type Item = (u32, f32);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Entries::BTree(range) => range.next().map(|(key, value)| (*key, *value)),
            Entries::Paired(zip) => zip.next().map(|(key, value)| (*key, *value)),
        }
    }
}

/// Ordered iterator over store entries with mutable values
pub enum EntriesMut<'a> {
    /// Tree-map range
    BTree(btree_map::RangeMut<'a, u32, f32>),
    /// Zipped key slice and mutable value slice
    Paired(Zip<slice::Iter<'a, u32>, slice::IterMut<'a, f32>>),
}

impl<'a> Iterator for EntriesMut<'a> {
    type Item = (u32, &'a mut f32);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EntriesMut::BTree(range) => range.next().map(|(key, value)| (*key, value)),
            EntriesMut::Paired(zip) => zip.next().map(|(key, value)| (*key, value)),
        }
    }
}

/// Serialized form of a store: tag plus parallel key/value arrays
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatStore {
    /// Backend the store should be rebuilt with
    pub tag: StoreTag,
    /// Keys in strictly ascending order
    pub keys: Vec<u32>,
    /// Values aligned with `keys` by position
    pub values: Vec<f32>,
}
