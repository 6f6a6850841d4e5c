//! Initial condition generator
//!
//! Fills interior cells from an analytic function of the cell-centre
//! coordinates. The value written to a cell depends only on its global index,
//! so the result is bit-for-bit identical for every decomposition and every
//! execution order.

use crate::field::{MultiField, PatchField};
use crate::grid::{Geometry, MAX_DIM};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Fill every interior cell of `field` with `f(coords)`
///
/// `coords` holds the `geometry.dim()` cell-centre coordinates
/// `prob_lo[a] + (i_a + 0.5) * dx[a]`. Ghost cells are not touched.
///
/// # Arguments
///
/// * `field` - Patch to fill; its interior box selects the cells
/// * `geometry` - Maps each index to its cell-centre coordinates
/// * `f` - Analytic initial value at a point
pub fn init_patch<F>(field: &mut PatchField, geometry: &Geometry, f: F)
where
    F: Fn(&[f64]) -> f64,
{
    let dim = geometry.dim();
    let mut coords = [0.0; MAX_DIM];
    let valid = *field.valid_box();
    for iv in valid.cells() {
        geometry.cell_center_coords(&iv, &mut coords);
        field.set(&iv, f(&coords[..dim]));
    }
}

/// Fill the interior of every patch in parallel
pub fn init<F>(field: &mut MultiField, geometry: &Geometry, f: F)
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    field
        .patches_mut()
        .par_iter_mut()
        .for_each(|patch| init_patch(patch, geometry, &f));
}

/// Localized Gaussian bump `base + amplitude * exp(-|x - center|² / width_sq)`
///
/// The distance runs over the first `center.len()` axes only, so a bump with a
/// two-component centre is a 2-D profile extruded along any further axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBump {
    /// Bump centre; its length is the number of axes the bump depends on
    pub center: Vec<f64>,
    /// Squared width in the exponent denominator
    pub width_sq: f64,
    /// Background value far from the centre
    pub base: f64,
    /// Peak height above the background
    pub amplitude: f64,
}

impl GaussianBump {
    /// `1 + exp(-((x-0.5)² + (y-0.75)²) / 0.01)`
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            center: vec![0.5, 0.75],
            width_sq: 0.01,
            base: 1.0,
            amplitude: 1.0,
        }
    }

    /// Evaluate at physical coordinates `coords`
    #[must_use]
    pub fn evaluate(&self, coords: &[f64]) -> f64 {
        let r2: f64 = coords
            .iter()
            .zip(&self.center)
            .map(|(x, c)| (x - c).powi(2))
            .sum::<f64>()
            / self.width_sq;
        self.base + self.amplitude * (-r2).exp()
    }
}

impl Default for GaussianBump {
    fn default() -> Self {
        Self::canonical()
    }
}
