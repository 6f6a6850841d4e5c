//! Face flux computation
//!
//! Fluxes live on cell faces. Along axis `a`, face `i` separates cell `i-1`
//! (left) from cell `i` (right), so a patch with interior `[lo, hi]` has faces
//! `lo..=hi+1` along that axis. Each flux depends only on the two adjacent
//! cell values and their centre-to-centre distance, which makes every face
//! independent of every other.
//!
//! # Canonical diffusion flux
//!
//! ```text
//! F_{i-1/2} = -D (φ_i - φ_{i-1}) / Δx
//! ```
//!
//! Domain faces are treated like any other: the boundary table has already
//! written the ghost value, and the distance is the full cell spacing.

use crate::field::PatchField;
use crate::grid::{Geometry, IndexBox, MAX_DIM};

/// Two-point flux rule
pub trait FluxRule: Sync {
    /// Flux through a face along `axis` from the `left` value to the `right`
    /// value, whose centres are `distance` apart
    fn face_flux(&self, axis: usize, left: f64, right: f64, distance: f64) -> f64;

    /// Largest stable explicit step on `geometry`, `∞` when unknown
    fn max_stable_dt(&self, _geometry: &Geometry) -> f64 {
        f64::INFINITY
    }
}

impl<F> FluxRule for F
where
    F: Fn(usize, f64, f64, f64) -> f64 + Sync,
{
    fn face_flux(&self, axis: usize, left: f64, right: f64, distance: f64) -> f64 {
        self(axis, left, right, distance)
    }
}

/// Fickian diffusion with a constant coefficient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diffusion {
    /// Diffusion coefficient `D` (units²/time)
    pub coefficient: f64,
}

impl Diffusion {
    #[must_use]
    pub const fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }
}

impl FluxRule for Diffusion {
    #[inline]
    fn face_flux(&self, _axis: usize, left: f64, right: f64, distance: f64) -> f64 {
        -self.coefficient * (right - left) / distance
    }

    /// `1 / (2 D Σ 1/Δx_a²)`, i.e. `Δx²/(2D)` in 1-D and `Δx²/(4D)` on a square 2-D grid
    fn max_stable_dt(&self, geometry: &Geometry) -> f64 {
        let inv_sq: f64 = (0..geometry.dim())
            .map(|axis| geometry.cell_size(axis).powi(-2))
            .sum();
        1.0 / (2.0 * self.coefficient * inv_sq)
    }
}

/// First-order upwind advection with a constant velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpwindAdvection {
    /// Velocity per axis
    pub velocity: [f64; MAX_DIM],
}

impl FluxRule for UpwindAdvection {
    #[inline]
    fn face_flux(&self, axis: usize, left: f64, right: f64, _distance: f64) -> f64 {
        let u = self.velocity[axis];
        if u >= 0.0 {
            u * left
        } else {
            u * right
        }
    }

    /// CFL limit `1 / Σ |u_a|/Δx_a`
    fn max_stable_dt(&self, geometry: &Geometry) -> f64 {
        let rate: f64 = (0..geometry.dim())
            .map(|axis| self.velocity[axis].abs() / geometry.cell_size(axis))
            .sum();
        if rate > 0.0 {
            1.0 / rate
        } else {
            f64::INFINITY
        }
    }
}

/// Face fluxes of one patch, one array per active axis
#[derive(Debug, Clone, PartialEq)]
pub struct FaceFluxes {
    faces: [IndexBox; MAX_DIM],
    values: [Vec<f64>; MAX_DIM],
}

impl FaceFluxes {
    /// Face box along `axis`: the interior box extended by one on the high side
    #[must_use]
    pub fn face_box(&self, axis: usize) -> &IndexBox {
        &self.faces[axis]
    }

    /// Flux through face `iv` along `axis`
    #[inline]
    #[must_use]
    pub fn get(&self, axis: usize, iv: &[i64; MAX_DIM]) -> f64 {
        let b = &self.faces[axis];
        let nx = b.len(0);
        let ny = b.len(1);
        let i = (iv[0] - b.lo[0]) as usize;
        let j = (iv[1] - b.lo[1]) as usize;
        let k = (iv[2] - b.lo[2]) as usize;
        self.values[axis][(k * ny + j) * nx + i]
    }
}

/// Compute the flux through every face of `field`'s interior box
///
/// # Arguments
///
/// * `field` - Patch whose ghost cells are already filled
/// * `geometry` - Supplies the centre-to-centre distance along each axis
/// * `rule` - Two-point flux evaluated once per face
///
/// # Returns
///
/// One flux array per active axis, indexed by the face box
pub fn compute_fluxes<R: FluxRule + ?Sized>(
    field: &PatchField,
    geometry: &Geometry,
    rule: &R,
) -> FaceFluxes {
    let valid = *field.valid_box();
    let mut faces = [valid; MAX_DIM];
    let mut values: [Vec<f64>; MAX_DIM] = Default::default();

    for axis in 0..geometry.dim() {
        let mut face_box = valid;
        face_box.hi[axis] += 1;
        faces[axis] = face_box;

        let dx = geometry.cell_size(axis);
        values[axis] = face_box
            .cells()
            .map(|iv| {
                let mut left = iv;
                left[axis] -= 1;
                rule.face_flux(axis, field.get(&left), field.get(&iv), dx)
            })
            .collect();
    }

    FaceFluxes { faces, values }
}
