//! Run configuration
//!
//! [`HeatConfig`] describes a complete heat-equation run: domain, resolution,
//! decomposition, boundary conditions and time stepping. It deserializes from
//! JSON with every field optional; missing fields take the defaults below.
//!
//! ```json
//! {
//!   "n_cell": [64, 64],
//!   "max_grid_size": 32,
//!   "periodic": [false, true],
//!   "bc_lo": [{"kind": "fixed_value", "value": 0.0}, {"kind": "periodic"}],
//!   "bc_hi": [{"kind": "zero_gradient"}, {"kind": "periodic"}],
//!   "nsteps": 500
//! }
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::grid::{Geometry, IndexBox, PatchLayout};
use crate::solver::{BoundaryKind, BoundaryTable, Side};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete description of a heat-equation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    /// Cells per axis; its length is the dimensionality
    pub n_cell: Vec<usize>,
    /// Physical lower corner
    pub prob_lo: Vec<f64>,
    /// Physical upper corner
    pub prob_hi: Vec<f64>,
    /// Periodicity per axis
    pub periodic: Vec<bool>,
    /// Boundary kind on the low side of each axis
    pub bc_lo: Vec<BoundaryKind>,
    /// Boundary kind on the high side of each axis
    pub bc_hi: Vec<BoundaryKind>,
    /// Largest patch extent per axis, in cells
    pub max_grid_size: usize,
    /// Ghost layers around each patch
    pub ghost_width: usize,
    /// Number of time steps to run
    pub nsteps: usize,
    /// Steps between progress reports (0 disables them)
    pub plot_int: usize,
    /// Diffusion coefficient `D`
    pub diffusion_coefficient: f64,
    /// Fraction of the stable step used when `dt` is not given
    pub cfl: f64,
    /// Explicit time step; overrides `cfl` when set
    pub dt: Option<f64>,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            n_cell: vec![32, 32],
            prob_lo: vec![0.0, 0.0],
            prob_hi: vec![1.0, 1.0],
            periodic: vec![true, true],
            bc_lo: vec![BoundaryKind::Periodic; 2],
            bc_hi: vec![BoundaryKind::Periodic; 2],
            max_grid_size: 16,
            ghost_width: 1,
            nsteps: 1000,
            plot_int: 100,
            diffusion_coefficient: 1.0,
            cfl: 0.9,
            dt: None,
        }
    }
}

impl HeatConfig {
    /// Parse a JSON configuration
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Number of spatial axes
    #[must_use]
    pub fn dim(&self) -> usize {
        self.n_cell.len()
    }

    /// Replace the boundary entries of every axis with `kind` and set the
    /// periodicity to match
    pub fn set_uniform_boundary(&mut self, kind: BoundaryKind) {
        let dim = self.dim();
        self.periodic = vec![kind == BoundaryKind::Periodic; dim];
        self.bc_lo = vec![kind; dim];
        self.bc_hi = vec![kind; dim];
    }

    /// Check scalar parameters and per-axis list lengths
    ///
    /// Geometry and boundary consistency are checked when the components are
    /// built.
    pub fn validate(&self) -> ConfigResult<()> {
        let dim = self.dim();
        if dim == 0 || dim > 3 {
            return Err(ConfigError::InvalidDimension(dim));
        }
        for (what, actual) in [
            ("prob_lo", self.prob_lo.len()),
            ("prob_hi", self.prob_hi.len()),
            ("periodic", self.periodic.len()),
            ("bc_lo", self.bc_lo.len()),
            ("bc_hi", self.bc_hi.len()),
        ] {
            if actual != dim {
                return Err(ConfigError::DimensionMismatch {
                    what,
                    expected: dim,
                    actual,
                });
            }
        }
        if let Some(axis) = self.n_cell.iter().position(|&n| n == 0) {
            return Err(ConfigError::parameter(
                "n_cell",
                format!("axis {axis} has no cells"),
            ));
        }
        if !(self.diffusion_coefficient.is_finite() && self.diffusion_coefficient > 0.0) {
            return Err(ConfigError::parameter(
                "diffusion_coefficient",
                format!("must be finite and positive, got {}", self.diffusion_coefficient),
            ));
        }
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(ConfigError::parameter(
                "cfl",
                format!("must be finite and positive, got {}", self.cfl),
            ));
        }
        if let Some(dt) = self.dt {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(ConfigError::parameter(
                    "dt",
                    format!("must be finite and positive, got {dt}"),
                ));
            }
        }
        Ok(())
    }

    /// Build the geometry descriptor
    pub fn geometry(&self) -> ConfigResult<Geometry> {
        self.validate()?;
        Geometry::new(
            IndexBox::from_size(&self.n_cell),
            &self.prob_lo,
            &self.prob_hi,
            &self.periodic,
        )
    }

    /// Build the boundary table from `bc_lo` / `bc_hi`
    pub fn boundary_table(&self) -> ConfigResult<BoundaryTable> {
        self.validate()?;
        let table = self
            .bc_lo
            .iter()
            .zip(&self.bc_hi)
            .enumerate()
            .fold(BoundaryTable::new(), |table, (axis, (&lo, &hi))| {
                table.with(axis, Side::Low, lo).with(axis, Side::High, hi)
            });
        Ok(table)
    }

    /// Decompose `geometry` into patches of at most `max_grid_size` cells per axis
    pub fn layout(&self, geometry: &Geometry) -> ConfigResult<PatchLayout> {
        PatchLayout::chop(geometry, self.max_grid_size, self.ghost_width)
    }
}
