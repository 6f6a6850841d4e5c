//! Integer index boxes
//!
//! An [`IndexBox`] is an axis-aligned, inclusive range of cell indices. Boxes are
//! always stored with three axes; axes beyond the simulation dimensionality are
//! degenerate (`lo == hi == 0`).

use serde::{Deserialize, Serialize};

/// Integer cell index, always three components
pub type IntVect = [i64; 3];

/// Maximum number of spatial axes
pub const MAX_DIM: usize = 3;

/// Axis-aligned inclusive index range `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexBox {
    /// Lowest cell index per axis
    pub lo: IntVect,
    /// Highest cell index per axis (inclusive)
    pub hi: IntVect,
}

impl IndexBox {
    /// Create a box from its inclusive corners
    #[must_use]
    pub const fn new(lo: IntVect, hi: IntVect) -> Self {
        Self { lo, hi }
    }

    /// Box `[0, n-1]` along each listed axis, degenerate along the rest
    ///
    /// # Panics
    ///
    /// Panics if more than three sizes are given
    #[must_use]
    pub fn from_size(n_cell: &[usize]) -> Self {
        assert!(n_cell.len() <= MAX_DIM, "at most three axes supported");
        let mut hi = [0; MAX_DIM];
        for (axis, &n) in n_cell.iter().enumerate() {
            hi[axis] = n as i64 - 1;
        }
        Self { lo: [0; MAX_DIM], hi }
    }

    /// Number of cells along `axis` (zero when the box is empty on that axis)
    #[must_use]
    pub fn len(&self, axis: usize) -> usize {
        (self.hi[axis] - self.lo[axis] + 1).max(0) as usize
    }

    /// Total number of cells
    #[must_use]
    pub fn num_cells(&self) -> usize {
        (0..MAX_DIM).map(|axis| self.len(axis)).product()
    }

    /// True when the box holds no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..MAX_DIM).any(|axis| self.hi[axis] < self.lo[axis])
    }

    #[must_use]
    pub fn contains(&self, iv: &IntVect) -> bool {
        (0..MAX_DIM).all(|axis| iv[axis] >= self.lo[axis] && iv[axis] <= self.hi[axis])
    }

    /// True when `other` lies entirely inside this box
    #[must_use]
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        other.is_empty() || (self.contains(&other.lo) && self.contains(&other.hi))
    }

    /// Overlap of two boxes, `None` when they are disjoint
    #[must_use]
    pub fn intersect(&self, other: &IndexBox) -> Option<IndexBox> {
        let mut lo = [0; MAX_DIM];
        let mut hi = [0; MAX_DIM];
        for axis in 0..MAX_DIM {
            lo[axis] = self.lo[axis].max(other.lo[axis]);
            hi[axis] = self.hi[axis].min(other.hi[axis]);
            if lo[axis] > hi[axis] {
                return None;
            }
        }
        Some(IndexBox { lo, hi })
    }

    /// Box grown by `amount[axis]` cells on both sides of each axis
    #[must_use]
    pub fn grow(&self, amount: &IntVect) -> IndexBox {
        let mut out = *self;
        for axis in 0..MAX_DIM {
            out.lo[axis] -= amount[axis];
            out.hi[axis] += amount[axis];
        }
        out
    }

    /// Box translated by `offset`
    #[must_use]
    pub fn shifted(&self, offset: &IntVect) -> IndexBox {
        let mut out = *self;
        for axis in 0..MAX_DIM {
            out.lo[axis] += offset[axis];
            out.hi[axis] += offset[axis];
        }
        out
    }

    /// Iterate over every cell, x fastest
    pub fn cells(&self) -> impl Iterator<Item = IntVect> {
        let b = *self;
        let (nx, ny, nz) = (b.len(0) as i64, b.len(1) as i64, b.len(2) as i64);
        (0..nz).flat_map(move |k| {
            (0..ny).flat_map(move |j| {
                (0..nx).map(move |i| [b.lo[0] + i, b.lo[1] + j, b.lo[2] + k])
            })
        })
    }
}

impl std::fmt::Display for IndexBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(({},{},{}) ({},{},{}))",
            self.lo[0], self.lo[1], self.lo[2], self.hi[0], self.hi[1], self.hi[2]
        )
    }
}
