//! Explicit update engine
//!
//! Advances a field by one forward-Euler step in finite-volume divergence form:
//!
//! ```text
//! φⁿ⁺¹_i = φⁿ_i + Δt Σ_a (F_a[i] - F_a[i + e_a]) / Δx_a
//! ```
//!
//! where `F_a[i]` is the flux through the low face of cell `i` along axis `a`.
//! The step reads only the old buffer and writes only the new one; the caller
//! swaps them afterwards.
//!
//! # Stability
//!
//! `dt` is not checked. For diffusion it must satisfy
//! `dt <= 1 / (2 D Σ 1/Δx_a²)` (see [`FluxRule::max_stable_dt`]); a larger
//! step silently produces a diverging solution.

use super::boundary::BoundaryTable;
use super::flux::{compute_fluxes, FaceFluxes, FluxRule};
use super::ghost_exchange::{fill_ghosts, GhostExchange, LocalExchange};
use super::initial_condition::init;
use crate::error::{ConfigError, ConfigResult};
use crate::field::{MultiField, PatchField};
use crate::grid::{Geometry, PatchLayout, MAX_DIM};
use rayon::prelude::*;
use tracing::info;

/// Write `old + dt * div(F)` into the interior of `new`
///
/// `new` must have the same interior box as `old`; its ghosts are not written.
pub fn update_patch(
    old: &PatchField,
    fluxes: &FaceFluxes,
    geometry: &Geometry,
    dt: f64,
    new: &mut PatchField,
) {
    debug_assert_eq!(old.valid_box(), new.valid_box());
    let dim = geometry.dim();
    let mut inv_dx = [0.0; MAX_DIM];
    for axis in 0..dim {
        inv_dx[axis] = 1.0 / geometry.cell_size(axis);
    }

    let valid = *old.valid_box();
    for iv in valid.cells() {
        let mut div = 0.0;
        for axis in 0..dim {
            let mut upper = iv;
            upper[axis] += 1;
            div += (fluxes.get(axis, &iv) - fluxes.get(axis, &upper)) * inv_dx[axis];
        }
        new.set(&iv, old.get(&iv) + dt * div);
    }
}

/// One explicit step on a single patch whose ghosts are already filled
pub fn advance_patch<R: FluxRule + ?Sized>(
    old: &PatchField,
    new: &mut PatchField,
    geometry: &Geometry,
    rule: &R,
    dt: f64,
) {
    let fluxes = compute_fluxes(old, geometry, rule);
    update_patch(old, &fluxes, geometry, dt, new);
}

/// Validated bundle of geometry, decomposition, boundary table and flux rule
///
/// Construction performs every configuration check; stepping afterwards is
/// infallible and keeps no state between calls.
#[derive(Debug, Clone)]
pub struct UpdateEngine<R, X = LocalExchange> {
    geometry: Geometry,
    layout: PatchLayout,
    table: BoundaryTable,
    rule: R,
    exchange: X,
}

impl<R: FluxRule> UpdateEngine<R, LocalExchange> {
    /// Engine using the in-process ghost exchange
    ///
    /// # Errors
    ///
    /// Any error from [`BoundaryTable::validate`], or
    /// [`ConfigError::Decomposition`] when a layout box has extent on an axis
    /// the geometry does not use.
    pub fn new(
        geometry: Geometry,
        layout: PatchLayout,
        table: BoundaryTable,
        rule: R,
    ) -> ConfigResult<Self> {
        Self::with_exchange(geometry, layout, table, rule, LocalExchange)
    }
}

impl<R: FluxRule, X: GhostExchange> UpdateEngine<R, X> {
    /// Engine using a caller-supplied ghost exchange service
    pub fn with_exchange(
        geometry: Geometry,
        layout: PatchLayout,
        table: BoundaryTable,
        rule: R,
        exchange: X,
    ) -> ConfigResult<Self> {
        table.validate(&geometry)?;
        if !layout
            .boxes()
            .iter()
            .all(|b| geometry.domain().contains_box(b))
        {
            return Err(ConfigError::Decomposition(
                "layout does not belong to this geometry".into(),
            ));
        }

        info!(
            "Update engine ready: {}-D domain {}, {} patches, ghost width {}",
            geometry.dim(),
            geometry.domain(),
            layout.len(),
            layout.ghost()
        );

        Ok(Self {
            geometry,
            layout,
            table,
            rule,
            exchange,
        })
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    #[must_use]
    pub fn boundary_table(&self) -> &BoundaryTable {
        &self.table
    }

    #[must_use]
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Largest stable step reported by the flux rule
    #[must_use]
    pub fn max_stable_dt(&self) -> f64 {
        self.rule.max_stable_dt(&self.geometry)
    }

    /// Allocate a zero-filled field on this engine's layout
    #[must_use]
    pub fn allocate(&self) -> MultiField {
        MultiField::new(&self.layout)
    }

    /// Fill the interior of `field` from the analytic function `f`
    pub fn init<F>(&self, field: &mut MultiField, f: F)
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        init(field, &self.geometry, f);
    }

    /// Refill every ghost cell of `field` (exchange, then boundary table)
    pub fn fill_ghosts(&self, field: &mut MultiField) {
        fill_ghosts(
            field,
            &self.layout,
            &self.geometry,
            &self.table,
            &self.exchange,
        );
    }

    /// Advance `old` by `dt`, writing the result into the interior of `new`
    ///
    /// The ghosts of `old` are refilled first; that fill completes for every
    /// patch before any flux is computed. `old`'s interior is not modified.
    /// Swap the buffers afterwards to continue.
    ///
    /// # Arguments
    ///
    /// * `old` - Current state; only its ghost cells are written
    /// * `new` - Receives the advanced interior values
    /// * `dt` - Time step, used as given
    ///
    /// # Panics
    ///
    /// Panics if `old` and `new` were not allocated on this engine's layout
    pub fn advance(&self, old: &mut MultiField, new: &mut MultiField, dt: f64) {
        assert_eq!(
            old.len(),
            self.layout.len(),
            "old field does not match the engine layout"
        );
        assert_eq!(
            new.len(),
            self.layout.len(),
            "new field does not match the engine layout"
        );

        self.fill_ghosts(old);

        new.patches_mut()
            .par_iter_mut()
            .zip(old.patches().par_iter())
            .for_each(|(new_patch, old_patch)| {
                advance_patch(old_patch, new_patch, &self.geometry, &self.rule, dt);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::IndexBox;
    use crate::solver::{BoundaryKind, Diffusion};
    use approx::assert_relative_eq;

    fn engine_1d(
        n: usize,
        max_grid_size: usize,
        table: BoundaryTable,
        periodic: bool,
    ) -> UpdateEngine<Diffusion> {
        let geom = Geometry::new(IndexBox::from_size(&[n]), &[0.0], &[1.0], &[periodic])
            .expect("valid geometry");
        let layout = PatchLayout::chop(&geom, max_grid_size, 1).expect("valid layout");
        UpdateEngine::new(geom, layout, table, Diffusion::new(1.0)).expect("valid engine")
    }

    #[test]
    fn test_uniform_field_is_steady() {
        let engine = engine_1d(8, 3, BoundaryTable::periodic(1), true);
        let mut old = MultiField::with_value(engine.layout(), 2.0);
        let mut new = engine.allocate();
        engine.advance(&mut old, &mut new, 1e-3);
        assert!(new
            .gather(engine.geometry())
            .iter()
            .all(|&v| (v - 2.0).abs() < 1e-14));
    }

    #[test]
    fn test_old_interior_not_modified() {
        let engine = engine_1d(8, 4, BoundaryTable::periodic(1), true);
        let mut old = engine.allocate();
        engine.init(&mut old, |x| x[0] * x[0]);
        let before = old.gather(engine.geometry());
        let mut new = engine.allocate();
        engine.advance(&mut old, &mut new, 1e-4);
        assert_eq!(old.gather(engine.geometry()), before);
        assert_ne!(new.gather(engine.geometry()), before);
    }

    #[test]
    fn test_single_spike_spreads_symmetrically() {
        let engine = engine_1d(
            9,
            9,
            BoundaryTable::uniform(1, BoundaryKind::ZeroGradient),
            false,
        );
        let mut old = engine.allocate();
        old.patches_mut()[0].set(&[4, 0, 0], 1.0);
        let mut new = engine.allocate();
        let dx = engine.geometry().cell_size(0);
        let dt = 0.25 * dx * dx;
        engine.advance(&mut old, &mut new, dt);

        let g = new.gather(engine.geometry());
        // r = dt D / dx² = 0.25
        assert_relative_eq!(g[4], 0.5, epsilon = 1e-12);
        assert_relative_eq!(g[3], 0.25, epsilon = 1e-12);
        assert_relative_eq!(g[5], 0.25, epsilon = 1e-12);
        assert_eq!(g[0], 0.0);
    }

    #[test]
    fn test_fixed_value_wall_pulls_toward_value() {
        let table = BoundaryTable::uniform(1, BoundaryKind::FixedValue(0.0));
        let engine = engine_1d(4, 2, table, false);
        let mut old = MultiField::with_value(engine.layout(), 1.0);
        let mut new = engine.allocate();
        let dx = engine.geometry().cell_size(0);
        engine.advance(&mut old, &mut new, 0.1 * dx * dx);

        let g = new.gather(engine.geometry());
        // Edge cells lose r * (1 - 0) with r = 0.1, interior cells are steady
        assert_relative_eq!(g[0], 0.9, epsilon = 1e-12);
        assert_relative_eq!(g[3], 0.9, epsilon = 1e-12);
        assert_relative_eq!(g[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_table_rejected() {
        let geom = Geometry::new(IndexBox::from_size(&[4]), &[0.0], &[1.0], &[false])
            .expect("valid geometry");
        let layout = PatchLayout::chop(&geom, 4, 1).expect("valid layout");
        let err = UpdateEngine::new(geom, layout, BoundaryTable::new(), Diffusion::new(1.0))
            .expect_err("missing boundary entries");
        assert!(matches!(err, ConfigError::MissingBoundary { axis: 0, .. }));
    }

    #[test]
    fn test_foreign_layout_rejected() {
        let big = Geometry::new(IndexBox::from_size(&[8]), &[0.0], &[1.0], &[true])
            .expect("valid geometry");
        let small = Geometry::new(IndexBox::from_size(&[4]), &[0.0], &[1.0], &[true])
            .expect("valid geometry");
        let layout = PatchLayout::chop(&big, 4, 1).expect("valid layout");
        let err = UpdateEngine::new(small, layout, BoundaryTable::periodic(1), Diffusion::new(1.0))
            .expect_err("layout from another geometry");
        assert!(matches!(err, ConfigError::Decomposition(_)));
    }

    #[test]
    #[should_panic(expected = "does not match the engine layout")]
    fn test_mismatched_buffers_panic() {
        let engine = engine_1d(8, 4, BoundaryTable::periodic(1), true);
        let other = engine_1d(8, 8, BoundaryTable::periodic(1), true);
        let mut old = engine.allocate();
        let mut new = other.allocate();
        engine.advance(&mut old, &mut new, 1e-4);
    }
}
