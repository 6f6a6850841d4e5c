//! Heat-equation run orchestration
//!
//! `HeatSimulation` owns the two field buffers and drives the update engine:
//! every step refills ghosts on the old buffer, advances into the new buffer
//! and swaps them. Initialization runs the analytic initial condition over
//! every patch.

use crate::config::HeatConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::field::{FieldStats, MultiField};
use crate::grid::{Geometry, PatchLayout};
use crate::solver::{Diffusion, FluxRule, UpdateEngine};
use tracing::{debug, info, warn};

/// Explicit time-stepping run over a decomposed field
pub struct HeatSimulation<R: FluxRule = Diffusion> {
    engine: UpdateEngine<R>,

    // Ping-pong buffers (read from old, write to new, then swap)
    phi_old: MultiField,
    phi_new: MultiField,

    dt: f64,
    time: f64,
    steps_taken: usize,
    plot_int: usize,
}

impl HeatSimulation<Diffusion> {
    /// Build geometry, decomposition, boundary table and diffusion rule from `config`
    ///
    /// The step is `config.dt` when given, otherwise `cfl` times the
    /// diffusion stability limit.
    ///
    /// # Errors
    ///
    /// Any configuration error from the components; the run must not start.
    pub fn new(config: &HeatConfig) -> ConfigResult<Self> {
        info!("Creating heat simulation");

        let geometry = config.geometry()?;
        let table = config.boundary_table()?;
        let layout = config.layout(&geometry)?;
        let rule = Diffusion::new(config.diffusion_coefficient);
        let engine = UpdateEngine::new(geometry, layout, table, rule)?;

        let dt = config
            .dt
            .unwrap_or_else(|| config.cfl * engine.max_stable_dt());

        Self::from_engine(engine, dt, config.plot_int)
    }
}

impl<R: FluxRule> HeatSimulation<R> {
    /// Wrap an already validated engine
    ///
    /// `dt` is used as is; keeping it under the rule's stability limit is the
    /// caller's responsibility.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] when `dt` is not finite and positive.
    pub fn from_engine(engine: UpdateEngine<R>, dt: f64, plot_int: usize) -> ConfigResult<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigError::parameter(
                "dt",
                format!("must be finite and positive, got {dt}"),
            ));
        }
        let limit = engine.max_stable_dt();
        if dt > limit {
            warn!(
                "Time step {:.3e} exceeds the stability limit {:.3e}; the solution will diverge",
                dt, limit
            );
        }
        let phi_old = engine.allocate();
        let phi_new = engine.allocate();

        info!(
            "Heat simulation initialized: {} cells in {} patches, dt={:.3e} (stable limit {:.3e})",
            engine.geometry().domain().num_cells(),
            engine.layout().len(),
            dt,
            limit
        );

        Ok(Self {
            engine,
            phi_old,
            phi_new,
            dt,
            time: 0.0,
            steps_taken: 0,
            plot_int,
        })
    }

    /// Fill the current field from the analytic function `f` and reset the clock
    pub fn initialize<F>(&mut self, f: F)
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        self.engine.init(&mut self.phi_old, f);
        self.time = 0.0;
        self.steps_taken = 0;

        let stats = self.phi_old.stats();
        info!(
            "Initial field: sum={:.6e}, min={:.6}, max={:.6}",
            stats.sum, stats.min, stats.max
        );
    }

    /// Advance one time step
    pub fn step(&mut self) {
        self.engine
            .advance(&mut self.phi_old, &mut self.phi_new, self.dt);
        std::mem::swap(&mut self.phi_old, &mut self.phi_new);

        self.time += self.dt;
        self.steps_taken += 1;
        debug!("Advanced step {} (t = {:.6e})", self.steps_taken, self.time);
    }

    /// Advance `nsteps` steps, reporting every `plot_int` steps
    ///
    /// # Returns
    ///
    /// Statistics of the final field
    pub fn run(&mut self, nsteps: usize) -> FieldStats {
        for _ in 0..nsteps {
            self.step();
            if self.plot_int > 0 && self.steps_taken % self.plot_int == 0 {
                let stats = self.stats();
                info!(
                    "Step {}: t={:.6e}, sum={:.6e}, min={:.6}, max={:.6}",
                    self.steps_taken, self.time, stats.sum, stats.min, stats.max
                );
            }
        }
        self.stats()
    }

    /// Current (most recently advanced) field
    pub fn field(&self) -> &MultiField {
        &self.phi_old
    }

    /// Statistics of the current field
    pub fn stats(&self) -> FieldStats {
        self.phi_old.stats()
    }

    pub fn engine(&self) -> &UpdateEngine<R> {
        &self.engine
    }

    pub fn geometry(&self) -> &Geometry {
        self.engine.geometry()
    }

    pub fn layout(&self) -> &PatchLayout {
        self.engine.layout()
    }

    /// Time step in use
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time since initialization
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }
}
