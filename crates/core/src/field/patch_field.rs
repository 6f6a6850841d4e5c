//! Per-patch scalar storage
//!
//! A [`PatchField`] holds one value per cell of a patch's interior box plus a
//! ghost border, stored flat with x fastest. Interior cells are the solution;
//! ghost cells are a cache refilled before every flux computation.

use crate::grid::{IndexBox, IntVect};

/// Scalar field on one patch, including its ghost border
#[derive(Debug, Clone, PartialEq)]
pub struct PatchField {
    valid: IndexBox,
    grown: IndexBox,
    data: Vec<f64>,
}

impl PatchField {
    /// Create a zero-filled field for interior box `valid` with ghost width `ghost` per axis
    #[must_use]
    pub fn new(valid: IndexBox, ghost: &IntVect) -> Self {
        Self::with_value(valid, ghost, 0.0)
    }

    /// Create a field for `valid` with every cell (ghosts included) set to `value`
    #[must_use]
    pub fn with_value(valid: IndexBox, ghost: &IntVect, value: f64) -> Self {
        let grown = valid.grow(ghost);
        Self {
            valid,
            grown,
            data: vec![value; grown.num_cells()],
        }
    }

    /// Interior (authoritative) box
    #[must_use]
    pub fn valid_box(&self) -> &IndexBox {
        &self.valid
    }

    /// Storage box: interior plus ghost border
    #[must_use]
    pub fn grown_box(&self) -> &IndexBox {
        &self.grown
    }

    #[inline]
    fn offset(&self, iv: &IntVect) -> usize {
        debug_assert!(
            self.grown.contains(iv),
            "cell {iv:?} outside patch storage {}",
            self.grown
        );
        let nx = self.grown.len(0);
        let ny = self.grown.len(1);
        let i = (iv[0] - self.grown.lo[0]) as usize;
        let j = (iv[1] - self.grown.lo[1]) as usize;
        let k = (iv[2] - self.grown.lo[2]) as usize;
        (k * ny + j) * nx + i
    }

    /// Value at cell `iv`
    ///
    /// # Panics
    ///
    /// Panics if `iv` lies outside the storage box
    #[inline]
    #[must_use]
    pub fn get(&self, iv: &IntVect) -> f64 {
        assert!(self.grown.contains(iv), "Coordinates out of bounds");
        self.data[self.offset(iv)]
    }

    /// Set the value at cell `iv`
    ///
    /// # Panics
    ///
    /// Panics if `iv` lies outside the storage box
    #[inline]
    pub fn set(&mut self, iv: &IntVect, value: f64) {
        assert!(self.grown.contains(iv), "Coordinates out of bounds");
        let idx = self.offset(iv);
        self.data[idx] = value;
    }

    /// Raw storage, x fastest over the grown box
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Set every interior cell to `value`, leaving ghosts untouched
    pub fn fill_interior(&mut self, value: f64) {
        let valid = self.valid;
        for iv in valid.cells() {
            self.set(&iv, value);
        }
    }

    /// Iterate over `(cell, value)` for interior cells, x fastest
    pub fn interior_cells(&self) -> impl Iterator<Item = (IntVect, f64)> + '_ {
        self.valid.cells().map(move |iv| (iv, self.get(&iv)))
    }

    /// True when `iv` is a ghost cell of this patch
    #[must_use]
    pub fn is_ghost(&self, iv: &IntVect) -> bool {
        self.grown.contains(iv) && !self.valid.contains(iv)
    }

    /// Sum of interior values
    #[must_use]
    pub fn sum_interior(&self) -> f64 {
        self.interior_cells().map(|(_, v)| v).sum()
    }

    /// Largest absolute interior value
    #[must_use]
    pub fn max_abs_interior(&self) -> f64 {
        self.interior_cells()
            .map(|(_, v)| v.abs())
            .fold(0.0, f64::max)
    }
}
