//! Patch Heat Core Library
//!
//! Explicit time stepping of a scalar field on a structured grid that is
//! decomposed into rectangular patches with ghost-cell halos.
//!
//! ## Components
//!
//! - [`grid`]: index boxes, the geometry descriptor and the patch decomposition
//! - [`field`]: per-patch storage with ghost cells and the multi-patch field
//! - [`solver`]: initial conditions, boundary table, ghost exchange, face fluxes
//!   and the update engine
//! - [`simulation`]: the double-buffered run driver
//! - [`config`]: JSON-loadable run configuration
//!
//! The canonical run is 2-D diffusion of a Gaussian bump on the unit square:
//!
//! ```rust
//! use patch_heat_core::{GaussianBump, HeatConfig, HeatSimulation};
//!
//! let config = HeatConfig {
//!     n_cell: vec![16, 16],
//!     max_grid_size: 8,
//!     ..HeatConfig::default()
//! };
//! let mut sim = HeatSimulation::new(&config)?;
//! let bump = GaussianBump::canonical();
//! sim.initialize(|x| bump.evaluate(x));
//! let stats = sim.run(10);
//! assert!(stats.max < 2.0);
//! # Ok::<(), patch_heat_core::ConfigError>(())
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod grid;
pub mod simulation;
pub mod solver;

// Re-export the run surface
pub use config::HeatConfig;
pub use error::{ConfigError, ConfigResult};
pub use simulation::HeatSimulation;

// Re-export building blocks
pub use field::{FieldStats, MultiField, PatchField};
pub use grid::{Geometry, IndexBox, IntVect, PatchLayout};
pub use solver::{
    BoundaryKind, BoundaryTable, Diffusion, FluxRule, GaussianBump, GhostExchange,
    LocalExchange, Side, UpdateEngine, UpwindAdvection,
};
