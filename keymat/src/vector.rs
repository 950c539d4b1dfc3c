//! Sparse vectors: borrowed lane views and owned sequences
//!
//! A [`VectorView`] is a window over one lane of a matrix store - it owns no
//! data and stays valid for as long as the borrow it was created from. A
//! [`SparseVector`] owns its entries and is what rank-1 operations consume.
//! Both yield `(index, value)` entries with strictly ascending indices, the
//! shape the merge-join expects.

use std::ops::Range;

use keymat_core::validation;
use keymat_core::{merge, Result};

use crate::store::SparseStore;

/// Read-only view of one lane (row or column) of a matrix
#[derive(Debug, Clone)]
pub struct VectorView<'a> {
    store: &'a SparseStore,
    span: Range<u32>,
}

impl<'a> VectorView<'a> {
    pub(crate) fn new(store: &'a SparseStore, span: Range<u32>) -> Self {
        Self { store, span }
    }

    /// Number of stored entries in this lane
    pub fn element_size(&self) -> usize {
        self.store.range_len(self.span.clone())
    }

    /// Lane length, stored or not
    pub fn length(&self) -> u32 {
        self.span.end - self.span.start
    }

    /// Entries as `(lane-local index, value)`, ascending by index
    pub fn entries(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        let offset = self.span.start;
        self.store
            .range(self.span.clone())
            .map(move |(key, value)| (key - offset, value))
    }

    /// Value at a lane-local index, `None` when absent or out of range
    pub fn try_get(&self, index: u32) -> Option<f32> {
        if index >= self.length() {
            return None;
        }
        self.store.get(self.span.start + index)
    }

    /// Inner product with another ordered sparse sequence
    pub fn dot(&self, other: &SparseVector) -> f32 {
        merge::dot(self.entries(), other.entries())
    }

    /// Copy this lane into an owned vector
    pub fn to_vector(&self) -> SparseVector {
        let (indices, values) = self.entries().unzip();
        SparseVector {
            length: self.length(),
            indices,
            values,
        }
    }
}

/// Owned ordered sparse vector
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    length: u32,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Empty vector of the given length
    pub fn new(length: u32) -> Self {
        Self {
            length,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(index, value)` entries
    ///
    /// Entries may arrive in any order but indices must be unique and lie
    /// inside `[0, length)`.
    pub fn from_entries(length: u32, entries: impl IntoIterator<Item = (u32, f32)>) -> Result<Self> {
        let mut pairs: Vec<(u32, f32)> = entries.into_iter().collect();
        pairs.sort_by_key(|&(index, _)| index);
        let (indices, values): (Vec<u32>, Vec<f32>) = pairs.into_iter().unzip();
        validation::check_flat(&indices, &values, length as usize)?;
        Ok(Self {
            length,
            indices,
            values,
        })
    }

    /// Vector length, stored or not
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Number of stored entries
    pub fn element_size(&self) -> usize {
        self.indices.len()
    }

    /// Insert or overwrite one entry
    pub fn set(&mut self, index: u32, value: f32) -> Result<()> {
        validation::check_key(index, self.length as usize)?;
        match self.indices.binary_search(&index) {
            Ok(position) => self.values[position] = value,
            Err(position) => {
                self.indices.insert(position, index);
                self.values.insert(position, value);
            }
        }
        Ok(())
    }

    /// Value at `index`, `None` when absent or out of range
    pub fn try_get(&self, index: u32) -> Option<f32> {
        self.indices
            .binary_search(&index)
            .ok()
            .map(|position| self.values[position])
    }

    /// Entries as `(index, value)`, ascending by index
    pub fn entries(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Inner product with another sparse vector
    pub fn dot(&self, other: &SparseVector) -> f32 {
        merge::dot(self.entries(), other.entries())
    }
}
