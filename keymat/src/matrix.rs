//! Sparse, orientation-flexible matrix core
//!
//! A [`KeyMatrix`] owns a fixed layout (dimensions plus orientation), one
//! ordered [`SparseStore`], and a registry of size-change monitors. Absence
//! from the store *is* the unknown state: there is no in-band sentinel
//! value, removal is an explicit operation, and every removal is reported
//! to the attached monitors before the mutating call returns.
//!
//! Bulk arithmetic selects a serial or parallel strategy per call; both
//! strategies produce identical stores and identical notification
//! sequences.

use std::fmt;
use std::sync::Arc;

use keymat_core::{
    merge, validation, Layout, MatrixError, Orientation, Result, SizeChange, SizeMonitor,
    SparseAccess, StoreTag,
};

use crate::exec::{self, ExecMode};
use crate::monitor::MonitorRegistry;
use crate::store::{FlatStore, SparseStore};
use crate::vector::{SparseVector, VectorView};

/// One known cell, as seen by iteration visitors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Row index
    pub row: u32,
    /// Column index
    pub column: u32,
    /// Stored value
    pub value: f32,
}

/// Visitor verdict for one cell during [`KeyMatrix::update_cells`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellUpdate {
    /// Leave the cell untouched
    Keep,
    /// Overwrite the stored value
    Set(f32),
    /// Remove the cell; monitors are notified
    Clear,
}

/// Whether a product pass overwrites or adds into the target cell
#[derive(Clone, Copy)]
enum Combine {
    Replace,
    Accumulate,
}

impl Combine {
    fn apply(self, current: f32, product: f32) -> f32 {
        match self {
            Combine::Replace => product,
            Combine::Accumulate => current + product,
        }
    }
}

/// Sparse matrix over a linear key space
pub struct KeyMatrix {
    layout: Layout,
    store: SparseStore,
    monitors: MonitorRegistry,
}

impl KeyMatrix {
    /// Empty matrix with the default store backend
    pub fn new(orientation: Orientation, row_size: u32, column_size: u32) -> Result<Self> {
        Self::with_tag(orientation, row_size, column_size, StoreTag::BTree)
    }

    /// Empty matrix with an explicit store backend
    pub fn with_tag(
        orientation: Orientation,
        row_size: u32,
        column_size: u32,
        tag: StoreTag,
    ) -> Result<Self> {
        Ok(Self {
            layout: Layout::new(orientation, row_size, column_size)?,
            store: SparseStore::with_tag(tag),
            monitors: MonitorRegistry::new(),
        })
    }

    /// Matrix pre-populated from `(row, column, value)` triples
    pub fn from_cells(
        orientation: Orientation,
        row_size: u32,
        column_size: u32,
        cells: impl IntoIterator<Item = (u32, u32, f32)>,
    ) -> Result<Self> {
        let mut matrix = Self::new(orientation, row_size, column_size)?;
        for (row, column, value) in cells {
            matrix.set_value(row, column, value)?;
        }
        Ok(matrix)
    }

    /// Layout of this matrix
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Backend tag of the current store
    pub fn store_tag(&self) -> StoreTag {
        self.store.tag()
    }

    // --- cell operations -------------------------------------------------

    /// Value at `(row, column)`, failing fast when the cell is absent
    pub fn get_value(&self, row: u32, column: u32) -> Result<f32> {
        validation::check_cell(&self.layout, row, column)?;
        self.store
            .get(self.layout.key(row, column))
            .ok_or(MatrixError::MissingCell)
    }

    /// Insert or overwrite the value at `(row, column)`
    pub fn set_value(&mut self, row: u32, column: u32, value: f32) -> Result<()> {
        validation::check_cell(&self.layout, row, column)?;
        self.store.insert(self.layout.key(row, column), value);
        Ok(())
    }

    /// Multiply the stored value at `(row, column)` by `factor`
    pub fn scale_value(&mut self, row: u32, column: u32, factor: f32) -> Result<()> {
        validation::check_cell(&self.layout, row, column)?;
        let value = self
            .store
            .get_mut(self.layout.key(row, column))
            .ok_or(MatrixError::MissingCell)?;
        *value *= factor;
        Ok(())
    }

    /// Add `delta` to the stored value at `(row, column)`
    pub fn shift_value(&mut self, row: u32, column: u32, delta: f32) -> Result<()> {
        validation::check_cell(&self.layout, row, column)?;
        let value = self
            .store
            .get_mut(self.layout.key(row, column))
            .ok_or(MatrixError::MissingCell)?;
        *value += delta;
        Ok(())
    }

    /// Remove the cell at `(row, column)`
    ///
    /// Returns the removed value, or `None` when the cell was not stored.
    /// An actual removal notifies every attached monitor exactly once.
    pub fn remove(&mut self, row: u32, column: u32) -> Result<Option<f32>> {
        validation::check_cell(&self.layout, row, column)?;
        Ok(self.remove_key(self.layout.key(row, column)))
    }

    fn remove_key(&mut self, key: u32) -> Option<f32> {
        let old = self.store.len();
        let removed = self.store.remove(key)?;
        self.emit(SizeChange::between(self.layout.total_cells(), old, old - 1));
        Some(removed)
    }

    fn emit(&self, change: SizeChange) {
        self.monitors.notify(self, change);
    }

    // --- bulk mutation ---------------------------------------------------

    /// Drop every stored entry
    ///
    /// Fires one notification covering the whole transition; no-op on an
    /// already empty matrix.
    pub fn clear(&mut self) {
        let old = self.store.len();
        if old == 0 {
            return;
        }
        self.store.clear();
        self.emit(SizeChange::between(self.layout.total_cells(), old, 0));
    }

    /// Overwrite every stored entry with `value`; counts are unchanged
    pub fn fill(&mut self, value: f32) {
        for (_, slot) in self.store.iter_mut() {
            *slot = value;
        }
    }

    /// Multiply every stored entry by `factor`
    pub fn scale_all(&mut self, factor: f32) {
        for (_, slot) in self.store.iter_mut() {
            *slot *= factor;
        }
    }

    /// Add `delta` to every stored entry
    pub fn shift_all(&mut self, delta: f32) {
        for (_, slot) in self.store.iter_mut() {
            *slot += delta;
        }
    }

    /// Sum of all stored values, optionally of their absolute values
    pub fn get_sum(&self, absolute: bool) -> f32 {
        if absolute {
            self.store.iter().map(|(_, value)| value.abs()).sum()
        } else {
            self.store.iter().map(|(_, value)| value).sum()
        }
    }

    // --- views and iteration ---------------------------------------------

    /// View of one row; only available on row-major matrices
    pub fn row_vector(&self, row: u32) -> Result<VectorView<'_>> {
        match self.layout.orientation() {
            Orientation::RowMajor => {
                if row >= self.layout.row_size() {
                    return Err(MatrixError::CellOutOfBounds);
                }
                Ok(self.lane_view(row))
            }
            Orientation::ColumnMajor => Err(MatrixError::OrientationMismatch),
        }
    }

    /// View of one column; only available on column-major matrices
    pub fn column_vector(&self, column: u32) -> Result<VectorView<'_>> {
        match self.layout.orientation() {
            Orientation::ColumnMajor => {
                if column >= self.layout.column_size() {
                    return Err(MatrixError::CellOutOfBounds);
                }
                Ok(self.lane_view(column))
            }
            Orientation::RowMajor => Err(MatrixError::OrientationMismatch),
        }
    }

    fn lane_view(&self, lane: u32) -> VectorView<'_> {
        VectorView::new(&self.store, self.layout.lane_span(lane))
    }

    /// All known cells in ascending key order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let layout = self.layout;
        self.store.iter().map(move |(key, value)| {
            let (row, column) = layout.cell_of(key);
            Cell { row, column, value }
        })
    }

    /// Visit every known cell and apply the visitor's verdicts
    ///
    /// `Set` overwrites in place, `Clear` removes the cell and notifies
    /// monitors. Verdicts are applied in ascending key order under both
    /// execution modes, so the resulting store and the notification
    /// sequence are mode-independent.
    pub fn update_cells<F>(&mut self, mode: ExecMode, visit: F)
    where
        F: Fn(Cell) -> CellUpdate + Sync,
    {
        match mode {
            ExecMode::Serial => {
                let layout = self.layout;
                let mut removals = Vec::new();
                for (key, slot) in self.store.iter_mut() {
                    let (row, column) = layout.cell_of(key);
                    match visit(Cell {
                        row,
                        column,
                        value: *slot,
                    }) {
                        CellUpdate::Keep => {}
                        CellUpdate::Set(next) => *slot = next,
                        CellUpdate::Clear => removals.push(key),
                    }
                }
                for key in removals {
                    self.remove_key(key);
                }
            }
            ExecMode::Parallel => {
                let layout = self.layout;
                let store = &self.store;
                let batches = exec::compute_by_lane(layout.lane_count(), |lane| {
                    let mut verdicts = Vec::new();
                    for (key, value) in store.range(layout.lane_span(lane)) {
                        let (row, column) = layout.cell_of(key);
                        match visit(Cell { row, column, value }) {
                            CellUpdate::Keep => {}
                            verdict => verdicts.push((key, verdict)),
                        }
                    }
                    verdicts
                });
                for (key, verdict) in batches.into_iter().flatten() {
                    match verdict {
                        CellUpdate::Keep => {}
                        CellUpdate::Set(next) => {
                            self.store.insert(key, next);
                        }
                        CellUpdate::Clear => {
                            self.remove_key(key);
                        }
                    }
                }
            }
        }
    }

    // --- element-wise binary operations ----------------------------------

    /// Add the (possibly transposed) operand into this matrix
    pub fn add_matrix(&mut self, other: &KeyMatrix, transpose: bool, mode: ExecMode) -> Result<()> {
        self.merge_with(other, transpose, mode, |value, rhs| *value += rhs)
    }

    /// Subtract the (possibly transposed) operand from this matrix
    pub fn subtract_matrix(
        &mut self,
        other: &KeyMatrix,
        transpose: bool,
        mode: ExecMode,
    ) -> Result<()> {
        self.merge_with(other, transpose, mode, |value, rhs| *value -= rhs)
    }

    /// Multiply this matrix element-wise by the (possibly transposed) operand
    pub fn multiply_matrix(
        &mut self,
        other: &KeyMatrix,
        transpose: bool,
        mode: ExecMode,
    ) -> Result<()> {
        self.merge_with(other, transpose, mode, |value, rhs| *value *= rhs)
    }

    /// Divide this matrix element-wise by the (possibly transposed) operand
    pub fn divide_matrix(
        &mut self,
        other: &KeyMatrix,
        transpose: bool,
        mode: ExecMode,
    ) -> Result<()> {
        self.merge_with(other, transpose, mode, |value, rhs| *value /= rhs)
    }

    /// Shared walk for the element-wise binary operations
    ///
    /// Lane by lane, intersects this matrix's known cells with the operand
    /// lane and applies `apply` where indices coincide. Cells known only in
    /// this matrix stay untouched; cells known only in the operand are never
    /// created (the operation is sparse-preserving).
    fn merge_with<F>(
        &mut self,
        other: &KeyMatrix,
        transpose: bool,
        mode: ExecMode,
        apply: F,
    ) -> Result<()>
    where
        F: Fn(&mut f32, f32) + Sync,
    {
        let required = operand_orientation(self.layout.orientation(), transpose);
        if other.layout.orientation() != required {
            return Err(MatrixError::OrientationMismatch);
        }
        if other.layout.lane_count() != self.layout.lane_count()
            || other.layout.lane_length() != self.layout.lane_length()
        {
            return Err(MatrixError::DimensionMismatch);
        }
        match mode {
            ExecMode::Serial => {
                for lane in 0..self.layout.lane_count() {
                    let span = self.layout.lane_span(lane);
                    let offset = span.start;
                    let lhs = self
                        .store
                        .range_mut(span)
                        .map(|(key, value)| (key - offset, value));
                    merge::intersect_update(lhs, other.lane_view(lane).entries(), |value, rhs| {
                        apply(value, rhs)
                    });
                }
            }
            ExecMode::Parallel => {
                let layout = self.layout;
                let store = &self.store;
                let batches = exec::compute_by_lane(layout.lane_count(), |lane| {
                    let span = layout.lane_span(lane);
                    let offset = span.start;
                    let mut updates = Vec::new();
                    merge::intersect(
                        store.range(span).map(|(key, value)| (key - offset, value)),
                        other.lane_view(lane).entries(),
                        |index, current, rhs| {
                            let mut value = current;
                            apply(&mut value, rhs);
                            updates.push((offset + index, value));
                        },
                    );
                    updates
                });
                for (key, value) in batches.into_iter().flatten() {
                    self.store.insert(key, value);
                }
            }
        }
        Ok(())
    }

    // --- products --------------------------------------------------------

    /// Replace every known cell `(r, c)` with `dot(left lane r, right lane c)`
    ///
    /// The transpose flags select whether a lane means a row or a column of
    /// the operand; the operand's orientation must serve that axis.
    pub fn dot_product(
        &mut self,
        left: &KeyMatrix,
        left_transpose: bool,
        right: &KeyMatrix,
        right_transpose: bool,
        mode: ExecMode,
    ) -> Result<()> {
        self.product(left, left_transpose, right, right_transpose, mode, Combine::Replace)
    }

    /// Like [`dot_product`](Self::dot_product) but adds into the cell value
    pub fn accumulate_product(
        &mut self,
        left: &KeyMatrix,
        left_transpose: bool,
        right: &KeyMatrix,
        right_transpose: bool,
        mode: ExecMode,
    ) -> Result<()> {
        self.product(
            left,
            left_transpose,
            right,
            right_transpose,
            mode,
            Combine::Accumulate,
        )
    }

    fn product(
        &mut self,
        left: &KeyMatrix,
        left_transpose: bool,
        right: &KeyMatrix,
        right_transpose: bool,
        mode: ExecMode,
        combine: Combine,
    ) -> Result<()> {
        let left_required = if left_transpose {
            Orientation::ColumnMajor
        } else {
            Orientation::RowMajor
        };
        let right_required = if right_transpose {
            Orientation::RowMajor
        } else {
            Orientation::ColumnMajor
        };
        if left.layout.orientation() != left_required
            || right.layout.orientation() != right_required
        {
            return Err(MatrixError::OrientationMismatch);
        }
        if left.layout.lane_count() < self.layout.row_size()
            || right.layout.lane_count() < self.layout.column_size()
        {
            return Err(MatrixError::DimensionMismatch);
        }
        match mode {
            ExecMode::Serial => {
                let layout = self.layout;
                for (key, slot) in self.store.iter_mut() {
                    let (row, column) = layout.cell_of(key);
                    let product =
                        merge::dot(left.lane_view(row).entries(), right.lane_view(column).entries());
                    *slot = combine.apply(*slot, product);
                }
            }
            ExecMode::Parallel => {
                let layout = self.layout;
                let store = &self.store;
                let batches = exec::compute_by_lane(layout.lane_count(), |lane| {
                    store
                        .range(layout.lane_span(lane))
                        .map(|(key, value)| {
                            let (row, column) = layout.cell_of(key);
                            let product = merge::dot(
                                left.lane_view(row).entries(),
                                right.lane_view(column).entries(),
                            );
                            (key, combine.apply(value, product))
                        })
                        .collect::<Vec<_>>()
                });
                for (key, value) in batches.into_iter().flatten() {
                    self.store.insert(key, value);
                }
            }
        }
        Ok(())
    }

    /// Rank-1 update: overwrite intersected cells with `row_v * column_v`
    ///
    /// For every known entry of the driving vector (the row vector on a
    /// row-major matrix, the column vector otherwise), the matching lane of
    /// this matrix is intersected with the other vector and each
    /// intersected cell receives `drive_value * other_value`.
    pub fn dot_product_vectors(
        &mut self,
        row_vector: &SparseVector,
        column_vector: &SparseVector,
        mode: ExecMode,
    ) -> Result<()> {
        self.rank_one(row_vector, column_vector, mode, Combine::Replace)
    }

    /// Rank-1 update accumulating `row_v * column_v` into intersected cells
    pub fn accumulate_product_vectors(
        &mut self,
        row_vector: &SparseVector,
        column_vector: &SparseVector,
        mode: ExecMode,
    ) -> Result<()> {
        self.rank_one(row_vector, column_vector, mode, Combine::Accumulate)
    }

    fn rank_one(
        &mut self,
        row_vector: &SparseVector,
        column_vector: &SparseVector,
        mode: ExecMode,
        combine: Combine,
    ) -> Result<()> {
        let (drive, cross) = match self.layout.orientation() {
            Orientation::RowMajor => (row_vector, column_vector),
            Orientation::ColumnMajor => (column_vector, row_vector),
        };
        if drive.length() != self.layout.lane_count()
            || cross.length() != self.layout.lane_length()
        {
            return Err(MatrixError::DimensionMismatch);
        }
        match mode {
            ExecMode::Serial => {
                for (lane, scale) in drive.entries() {
                    let span = self.layout.lane_span(lane);
                    let offset = span.start;
                    let lhs = self
                        .store
                        .range_mut(span)
                        .map(|(key, value)| (key - offset, value));
                    merge::intersect_update(lhs, cross.entries(), |value, rhs| {
                        *value = combine.apply(*value, scale * rhs);
                    });
                }
            }
            ExecMode::Parallel => {
                let driving: Vec<(u32, f32)> = drive.entries().collect();
                let layout = self.layout;
                let store = &self.store;
                let batches = exec::compute_by_entry(&driving, |lane, scale| {
                    let span = layout.lane_span(lane);
                    let offset = span.start;
                    let mut updates = Vec::new();
                    merge::intersect(
                        store.range(span).map(|(key, value)| (key - offset, value)),
                        cross.entries(),
                        |index, current, rhs| {
                            updates.push((offset + index, combine.apply(current, scale * rhs)));
                        },
                    );
                    updates
                });
                for (key, value) in batches.into_iter().flatten() {
                    self.store.insert(key, value);
                }
            }
        }
        Ok(())
    }

    // --- monitors and persistence ----------------------------------------

    /// Register a size-change monitor; attaching twice has no extra effect
    pub fn attach_monitor(&mut self, monitor: &Arc<dyn SizeMonitor>) {
        self.monitors.attach(monitor);
    }

    /// Unregister a monitor; unknown or dropped monitors are a no-op
    pub fn detach_monitor(&mut self, monitor: &Arc<dyn SizeMonitor>) {
        self.monitors.detach(monitor);
    }

    /// Flatten the store into its persistence form
    pub fn flatten(&self) -> FlatStore {
        self.store.flatten()
    }

    /// Replace the store with one rebuilt from a flattened form
    ///
    /// The flattened arrays are validated against this matrix's cell count
    /// before anything is replaced; on error the current store is kept.
    pub fn rehydrate(&mut self, flat: FlatStore) -> Result<()> {
        let store =
            SparseStore::rehydrate(flat.tag, flat.keys, flat.values, self.layout.total_cells())?;
        log::debug!("rehydrated {} entries into {} store", store.len(), store.tag());
        self.store = store;
        Ok(())
    }
}

/// Orientation the operand of an element-wise walk must have
const fn operand_orientation(orientation: Orientation, transpose: bool) -> Orientation {
    match (orientation, transpose) {
        (Orientation::RowMajor, false) | (Orientation::ColumnMajor, true) => Orientation::RowMajor,
        (Orientation::RowMajor, true) | (Orientation::ColumnMajor, false) => {
            Orientation::ColumnMajor
        }
    }
}

impl SparseAccess for KeyMatrix {
    fn row_size(&self) -> u32 {
        self.layout.row_size()
    }

    fn column_size(&self) -> u32 {
        self.layout.column_size()
    }

    fn orientation(&self) -> Orientation {
        self.layout.orientation()
    }

    fn element_size(&self) -> usize {
        self.store.len()
    }

    fn try_get(&self, row: u32, column: u32) -> Option<f32> {
        if !self.layout.contains(row, column) {
            return None;
        }
        self.store.get(self.layout.key(row, column))
    }
}

/// Shape and content both participate in equality: two matrices with the
/// same stored entries but different declared dimensions or orientation
/// are distinct.
impl PartialEq for KeyMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout && self.store == other.store
    }
}

impl fmt::Debug for KeyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMatrix")
            .field("layout", &self.layout)
            .field("store", &self.store)
            .finish()
    }
}
