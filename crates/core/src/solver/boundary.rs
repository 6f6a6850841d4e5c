//! Boundary condition table
//!
//! One entry per (axis, side) describing how ghost cells beyond the physical
//! domain are filled. Periodic axes are filled by the ghost exchange from the
//! opposite end of the domain; every other kind is applied here, per patch,
//! after the exchange.
//!
//! # Fill rules for ghost layer `n` (1 = adjacent to the boundary)
//!
//! ```text
//! FixedValue(V)        ghost = V
//! ZeroGradient         ghost = v_b
//! LinearExtrapolation  ghost = v_b + n (v_b - v_{b∓1})
//! ```
//!
//! where `v_b` is the interior cell on the boundary and `v_{b∓1}` its inward
//! neighbour.

use crate::error::{ConfigError, ConfigResult};
use crate::field::PatchField;
use crate::grid::{Geometry, IndexBox, MAX_DIM};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Towards `-∞`
    Low,
    /// Towards `+∞`
    High,
}

impl Side {
    /// Both sides, low first
    pub const BOTH: [Side; 2] = [Side::Low, Side::High];

    /// Outward unit direction
    #[must_use]
    pub const fn sign(self) -> i64 {
        match self {
            Self::Low => -1,
            Self::High => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::High => write!(f, "high"),
        }
    }
}

/// How ghost cells beyond the domain edge are filled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Wrap around to the opposite end of the domain
    Periodic,
    /// Constant value on the boundary face
    FixedValue(f64),
    /// Copy the nearest interior value
    ZeroGradient,
    /// Extend the line through the two nearest interior values
    LinearExtrapolation,
}

/// Per-axis, per-side boundary entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryTable {
    lo: [Option<BoundaryKind>; MAX_DIM],
    hi: [Option<BoundaryKind>; MAX_DIM],
}

impl BoundaryTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same kind on both sides of the first `dim` axes
    #[must_use]
    pub fn uniform(dim: usize, kind: BoundaryKind) -> Self {
        (0..dim.min(MAX_DIM)).fold(Self::new(), |table, axis| table.with_axis(axis, kind))
    }

    /// Periodic on every axis up to `dim`
    #[must_use]
    pub fn periodic(dim: usize) -> Self {
        Self::uniform(dim, BoundaryKind::Periodic)
    }

    /// Set the entry for one side of one axis
    #[must_use]
    pub fn with(mut self, axis: usize, side: Side, kind: BoundaryKind) -> Self {
        match side {
            Side::Low => self.lo[axis] = Some(kind),
            Side::High => self.hi[axis] = Some(kind),
        }
        self
    }

    /// Set both sides of one axis
    #[must_use]
    pub fn with_axis(self, axis: usize, kind: BoundaryKind) -> Self {
        self.with(axis, Side::Low, kind).with(axis, Side::High, kind)
    }

    /// Entry for `(axis, side)`, if any
    #[must_use]
    pub fn entry(&self, axis: usize, side: Side) -> Option<BoundaryKind> {
        match side {
            Side::Low => self.lo[axis],
            Side::High => self.hi[axis],
        }
    }

    /// Check the table against `geometry`
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingBoundary`] when a non-periodic axis lacks an entry
    /// - [`ConfigError::PeriodicMismatch`] when an entry contradicts the
    ///   geometry's periodicity
    /// - [`ConfigError::InvalidBoundaryValue`] for non-finite fixed values or
    ///   linear extrapolation on an axis with a single cell
    pub fn validate(&self, geometry: &Geometry) -> ConfigResult<()> {
        for axis in 0..geometry.dim() {
            for side in Side::BOTH {
                let entry = self.entry(axis, side);
                if geometry.is_periodic(axis) {
                    if !matches!(entry, None | Some(BoundaryKind::Periodic)) {
                        return Err(ConfigError::PeriodicMismatch { axis, side });
                    }
                    continue;
                }
                match entry {
                    None => return Err(ConfigError::MissingBoundary { axis, side }),
                    Some(BoundaryKind::Periodic) => {
                        return Err(ConfigError::PeriodicMismatch { axis, side })
                    }
                    Some(BoundaryKind::FixedValue(v)) if !v.is_finite() => {
                        return Err(ConfigError::InvalidBoundaryValue {
                            axis,
                            side,
                            message: format!("fixed value {v} is not finite"),
                        });
                    }
                    Some(BoundaryKind::LinearExtrapolation) if geometry.domain().len(axis) < 2 => {
                        return Err(ConfigError::InvalidBoundaryValue {
                            axis,
                            side,
                            message: "linear extrapolation needs two cells along the axis".into(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Kind applied at a domain-boundary face of `axis`, `None` on periodic axes
    #[must_use]
    pub fn physical_entry(
        &self,
        geometry: &Geometry,
        axis: usize,
        side: Side,
    ) -> Option<BoundaryKind> {
        if geometry.is_periodic(axis) {
            None
        } else {
            self.entry(axis, side)
        }
    }
}

/// Fill the ghost cells of `field` that lie beyond the physical domain edge
///
/// Every non-periodic axis on which the patch's grown box crosses the domain
/// edge is filled, including patches whose interior stops short of the edge.
/// The edge cell itself may then be a ghost, so the exchange must run first.
/// Axes are processed in order and each slab spans the full grown extent of
/// the other axes, so corner ghosts end up as a function of interior values
/// only. Applying the fill twice gives the same ghosts.
pub fn fill_domain_boundary(field: &mut PatchField, geometry: &Geometry, table: &BoundaryTable) {
    let domain = geometry.domain();
    let grown = *field.grown_box();

    for axis in 0..geometry.dim() {
        for side in Side::BOTH {
            let Some(kind) = table.physical_entry(geometry, axis, side) else {
                continue;
            };
            let edge = match side {
                Side::Low => domain.lo[axis],
                Side::High => domain.hi[axis],
            };
            // Layers of the grown box beyond the edge
            let layers = match side {
                Side::Low => edge - grown.lo[axis],
                Side::High => grown.hi[axis] - edge,
            };
            if layers <= 0 {
                continue;
            }

            let out = side.sign();
            // Face slab through the boundary cell, full extent elsewhere
            let mut slab: IndexBox = grown;
            slab.lo[axis] = edge;
            slab.hi[axis] = edge;

            for base in slab.cells() {
                let v_b = field.get(&base);
                let mut inward = base;
                inward[axis] -= out;
                for n in 1..=layers {
                    let mut ghost = base;
                    ghost[axis] += out * n;
                    let value = match kind {
                        BoundaryKind::FixedValue(v) => v,
                        BoundaryKind::ZeroGradient => v_b,
                        BoundaryKind::LinearExtrapolation => {
                            v_b + n as f64 * (v_b - field.get(&inward))
                        }
                        // Periodic axes are filtered out by physical_entry
                        BoundaryKind::Periodic => continue,
                    };
                    field.set(&ghost, value);
                }
            }
        }
    }
}
