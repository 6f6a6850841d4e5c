//! Explicit patch solver
//!
//! The per-step pipeline for a decomposed scalar field:
//!
//! 1. [`fill_ghosts`]: ghost exchange between patches (a global barrier),
//!    then the [`BoundaryTable`] on physical domain edges
//! 2. [`compute_fluxes`]: one two-point [`FluxRule`] evaluation per face
//! 3. [`update_patch`]: divergence update into a separate output buffer
//!
//! [`UpdateEngine`] bundles the validated inputs and runs the pipeline over all
//! patches in parallel. [`init`] fills a field from an analytic function.
//!
//! # Example
//!
//! ```rust
//! use patch_heat_core::grid::{Geometry, IndexBox, PatchLayout};
//! use patch_heat_core::solver::{BoundaryTable, Diffusion, GaussianBump, UpdateEngine};
//!
//! let geom = Geometry::new(IndexBox::from_size(&[32, 32]), &[0.0, 0.0], &[1.0, 1.0], &[true, true])?;
//! let layout = PatchLayout::chop(&geom, 16, 1)?;
//! let engine = UpdateEngine::new(geom, layout, BoundaryTable::periodic(2), Diffusion::new(1.0))?;
//!
//! let bump = GaussianBump::canonical();
//! let mut old = engine.allocate();
//! let mut new = engine.allocate();
//! engine.init(&mut old, |x| bump.evaluate(x));
//!
//! let dt = 0.9 * engine.max_stable_dt();
//! engine.advance(&mut old, &mut new, dt);
//! std::mem::swap(&mut old, &mut new);
//! # Ok::<(), patch_heat_core::ConfigError>(())
//! ```

mod boundary;
mod flux;
mod ghost_exchange;
mod initial_condition;
mod update;

// Re-exports
pub use boundary::{fill_domain_boundary, BoundaryKind, BoundaryTable, Side};
pub use flux::{compute_fluxes, Diffusion, FaceFluxes, FluxRule, UpwindAdvection};
pub use ghost_exchange::{fill_ghosts, GhostExchange, LocalExchange};
pub use initial_condition::{init, init_patch, GaussianBump};
pub use update::{advance_patch, update_patch, UpdateEngine};
