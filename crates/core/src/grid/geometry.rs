//! Geometry descriptor
//!
//! Physical extent, cell spacing and periodicity of the discretized domain.
//! Built once at setup and shared read-only by every patch.

use super::index_box::{IndexBox, IntVect, MAX_DIM};
use crate::error::{ConfigError, ConfigResult};
use serde::Serialize;

/// Immutable description of the computational domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    dim: usize,
    domain: IndexBox,
    prob_lo: [f64; MAX_DIM],
    prob_hi: [f64; MAX_DIM],
    cell_size: [f64; MAX_DIM],
    periodic: [bool; MAX_DIM],
}

impl Geometry {
    /// Build a geometry for `domain` spanning `[prob_lo, prob_hi]`
    ///
    /// The dimensionality is `prob_lo.len()`; `prob_hi` and `periodic` must
    /// have the same length and `domain` must be degenerate on the unused axes.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidDimension`] for fewer than one or more than three axes
    /// - [`ConfigError::DimensionMismatch`] when the inputs disagree on the axis count
    /// - [`ConfigError::NonPositiveCellSize`] when any spacing is not finite and positive
    pub fn new(
        domain: IndexBox,
        prob_lo: &[f64],
        prob_hi: &[f64],
        periodic: &[bool],
    ) -> ConfigResult<Self> {
        let dim = prob_lo.len();
        if dim == 0 || dim > MAX_DIM {
            return Err(ConfigError::InvalidDimension(dim));
        }
        for (what, actual) in [("prob_hi", prob_hi.len()), ("periodic", periodic.len())] {
            if actual != dim {
                return Err(ConfigError::DimensionMismatch {
                    what,
                    expected: dim,
                    actual,
                });
            }
        }
        let active_axes = (0..MAX_DIM)
            .filter(|&axis| axis < dim || domain.len(axis) != 1 || domain.lo[axis] != 0)
            .count();
        if active_axes != dim {
            return Err(ConfigError::DimensionMismatch {
                what: "domain box",
                expected: dim,
                actual: active_axes,
            });
        }

        let mut geom = Self {
            dim,
            domain,
            prob_lo: [0.0; MAX_DIM],
            prob_hi: [1.0; MAX_DIM],
            cell_size: [1.0; MAX_DIM],
            periodic: [false; MAX_DIM],
        };
        for axis in 0..dim {
            let n = domain.len(axis);
            let dx = (prob_hi[axis] - prob_lo[axis]) / n as f64;
            if n == 0 || !dx.is_finite() || dx <= 0.0 {
                return Err(ConfigError::NonPositiveCellSize { axis, value: dx });
            }
            geom.prob_lo[axis] = prob_lo[axis];
            geom.prob_hi[axis] = prob_hi[axis];
            geom.cell_size[axis] = dx;
            geom.periodic[axis] = periodic[axis];
        }
        Ok(geom)
    }

    /// Number of active axes
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Index box of the whole discretized domain
    #[must_use]
    pub fn domain(&self) -> &IndexBox {
        &self.domain
    }

    /// Physical lower corner
    #[must_use]
    pub fn prob_lo(&self) -> &[f64] {
        &self.prob_lo[..self.dim]
    }

    /// Physical upper corner
    #[must_use]
    pub fn prob_hi(&self) -> &[f64] {
        &self.prob_hi[..self.dim]
    }

    /// Cell spacing along `axis`
    #[must_use]
    pub fn cell_size(&self, axis: usize) -> f64 {
        self.cell_size[axis]
    }

    /// Smallest spacing over the active axes
    #[must_use]
    pub fn min_cell_size(&self) -> f64 {
        self.cell_size[..self.dim]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    #[must_use]
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// Period of `axis` in cells
    #[must_use]
    pub fn period(&self, axis: usize) -> i64 {
        self.domain.len(axis) as i64
    }

    /// Ghost width per axis: `ghost` on active axes, zero elsewhere
    #[must_use]
    pub fn ghost_vect(&self, ghost: usize) -> IntVect {
        let mut g = [0; MAX_DIM];
        for axis in 0..self.dim {
            g[axis] = ghost as i64;
        }
        g
    }

    /// Physical coordinate of the centre of cell `i` along `axis`
    #[inline]
    #[must_use]
    pub fn cell_center(&self, axis: usize, i: i64) -> f64 {
        self.prob_lo[axis] + ((i - self.domain.lo[axis]) as f64 + 0.5) * self.cell_size[axis]
    }

    /// Write the cell-centre coordinates of `iv` into `out[..dim]`
    #[inline]
    pub fn cell_center_coords(&self, iv: &IntVect, out: &mut [f64; MAX_DIM]) {
        for axis in 0..self.dim {
            out[axis] = self.cell_center(axis, iv[axis]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_size_and_centers() {
        let geom = Geometry::new(
            IndexBox::from_size(&[10, 20]),
            &[0.0, -1.0],
            &[1.0, 1.0],
            &[false, true],
        )
        .expect("valid geometry");

        assert_eq!(geom.dim(), 2);
        assert_relative_eq!(geom.cell_size(0), 0.1);
        assert_relative_eq!(geom.cell_size(1), 0.1);
        assert_relative_eq!(geom.cell_center(0, 0), 0.05);
        assert_relative_eq!(geom.cell_center(1, 19), 0.95, epsilon = 1e-12);
        assert!(geom.is_periodic(1));
        assert!(!geom.is_periodic(0));
        assert_eq!(geom.ghost_vect(2), [2, 2, 0]);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = Geometry::new(IndexBox::from_size(&[4]), &[1.0], &[0.0], &[false])
            .expect_err("negative spacing");
        assert!(matches!(
            err,
            ConfigError::NonPositiveCellSize { axis: 0, .. }
        ));
    }

    #[test]
    fn test_zero_extent_rejected() {
        let err = Geometry::new(
            IndexBox::from_size(&[4, 4]),
            &[0.0, 0.5],
            &[1.0, 0.5],
            &[false, false],
        )
        .expect_err("zero spacing");
        assert!(matches!(
            err,
            ConfigError::NonPositiveCellSize { axis: 1, .. }
        ));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = Geometry::new(
            IndexBox::from_size(&[4, 4]),
            &[0.0, 0.0],
            &[1.0],
            &[false, false],
        )
        .expect_err("prob_hi too short");
        assert!(matches!(
            err,
            ConfigError::DimensionMismatch { what: "prob_hi", .. }
        ));

        let err = Geometry::new(IndexBox::from_size(&[4, 4]), &[0.0], &[1.0], &[false])
            .expect_err("2-D box with 1-D bounds");
        assert!(matches!(
            err,
            ConfigError::DimensionMismatch {
                what: "domain box",
                ..
            }
        ));

        let err = Geometry::new(IndexBox::from_size(&[]), &[], &[], &[])
            .expect_err("zero axes");
        assert!(matches!(err, ConfigError::InvalidDimension(0)));
    }
}
