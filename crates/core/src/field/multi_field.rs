//! Field over a whole decomposition
//!
//! A [`MultiField`] owns one [`PatchField`] per patch of a [`PatchLayout`].
//! Each patch's storage is owned exclusively; other patches see its values
//! only through the ghost exchange.

use super::patch_field::PatchField;
use crate::grid::{Geometry, IntVect, PatchLayout};
use rayon::prelude::*;

/// Summary statistics over interior cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    /// Sum of interior values
    pub sum: f64,
    /// Smallest interior value
    pub min: f64,
    /// Largest interior value
    pub max: f64,
    /// Largest absolute interior value
    pub max_abs: f64,
    /// Number of interior cells
    pub cells: usize,
}

impl FieldStats {
    const EMPTY: Self = Self {
        sum: 0.0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        max_abs: 0.0,
        cells: 0,
    };

    fn merge(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            max_abs: self.max_abs.max(other.max_abs),
            cells: self.cells + other.cells,
        }
    }

    fn of_patch(patch: &PatchField) -> Self {
        patch
            .interior_cells()
            .fold(Self::EMPTY, |acc, (_, v)| Self {
                sum: acc.sum + v,
                min: acc.min.min(v),
                max: acc.max.max(v),
                max_abs: acc.max_abs.max(v.abs()),
                cells: acc.cells + 1,
            })
    }
}

/// Scalar field over every patch of a layout
#[derive(Debug, Clone, PartialEq)]
pub struct MultiField {
    patches: Vec<PatchField>,
}

impl MultiField {
    /// Allocate a zero-filled field for every patch of `layout`
    #[must_use]
    pub fn new(layout: &PatchLayout) -> Self {
        Self::with_value(layout, 0.0)
    }

    /// Allocate a field for every patch of `layout` with all cells set to `value`
    #[must_use]
    pub fn with_value(layout: &PatchLayout, value: f64) -> Self {
        let patches = layout
            .boxes()
            .iter()
            .map(|b| PatchField::with_value(*b, layout.ghost_vect(), value))
            .collect();
        Self { patches }
    }

    #[must_use]
    pub fn patches(&self) -> &[PatchField] {
        &self.patches
    }

    pub fn patches_mut(&mut self) -> &mut [PatchField] {
        &mut self.patches
    }

    /// Number of patches
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Interior value at global cell `iv`, `None` outside the domain
    #[must_use]
    pub fn value_at(&self, layout: &PatchLayout, iv: &IntVect) -> Option<f64> {
        layout
            .patch_containing(iv)
            .map(|p| self.patches[p].get(iv))
    }

    /// Interior values of the whole domain, x fastest
    ///
    /// The result does not depend on how the domain was decomposed.
    #[must_use]
    pub fn gather(&self, geometry: &Geometry) -> Vec<f64> {
        let domain = geometry.domain();
        let nx = domain.len(0);
        let ny = domain.len(1);
        let mut out = vec![0.0; domain.num_cells()];
        for patch in &self.patches {
            for (iv, v) in patch.interior_cells() {
                let i = (iv[0] - domain.lo[0]) as usize;
                let j = (iv[1] - domain.lo[1]) as usize;
                let k = (iv[2] - domain.lo[2]) as usize;
                out[(k * ny + j) * nx + i] = v;
            }
        }
        out
    }

    /// Interior statistics, summed patch by patch in layout order
    #[must_use]
    pub fn stats(&self) -> FieldStats {
        let per_patch: Vec<FieldStats> = self.patches.par_iter().map(FieldStats::of_patch).collect();
        per_patch
            .into_iter()
            .fold(FieldStats::EMPTY, FieldStats::merge)
    }
}
