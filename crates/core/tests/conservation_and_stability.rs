//! Long-run properties of the explicit diffusion step
use approx::assert_relative_eq;
use patch_heat_core::grid::{Geometry, IndexBox, PatchLayout};
use patch_heat_core::solver::{
    BoundaryKind, BoundaryTable, Diffusion, FluxRule, GaussianBump, UpdateEngine,
};
use patch_heat_core::{HeatConfig, HeatSimulation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

/// Route the library's log output through the test harness (`RUST_LOG=debug` to see it)
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_periodic_diffusion_conserves_total() {
    let geom = Geometry::new(
        IndexBox::from_size(&[30, 18]),
        &[0.0, 0.0],
        &[1.5, 0.9],
        &[true, true],
    )
    .expect("valid geometry");
    let layout = PatchLayout::chop(&geom, 7, 1).expect("valid layout");
    let rule = Diffusion::new(0.3);
    let dt = 0.9 * rule.max_stable_dt(&geom);
    let engine = UpdateEngine::new(geom, layout, BoundaryTable::periodic(2), rule)
        .expect("valid engine");

    let mut rng = StdRng::seed_from_u64(11);
    let mut old = engine.allocate();
    for patch in old.patches_mut() {
        let cells: Vec<_> = patch.valid_box().cells().collect();
        for iv in cells {
            patch.set(&iv, rng.random_range(-2.0..5.0));
        }
    }
    let mut new = engine.allocate();
    let initial = old.stats();

    for _ in 0..200 {
        engine.advance(&mut old, &mut new, dt);
        std::mem::swap(&mut old, &mut new);
    }
    let last = old.stats();

    assert_relative_eq!(last.sum, initial.sum, max_relative = 1e-12);
    // Smoothing narrows the range
    assert!(last.max < initial.max);
    assert!(last.min > initial.min);
}

#[test]
fn test_insulated_walls_conserve_total() {
    init_tracing();
    let mut config = HeatConfig {
        n_cell: vec![20, 20],
        max_grid_size: 8,
        nsteps: 100,
        plot_int: 0,
        ..HeatConfig::default()
    };
    config.set_uniform_boundary(BoundaryKind::ZeroGradient);

    let mut sim = HeatSimulation::new(&config).expect("valid config");
    let bump = GaussianBump::canonical();
    sim.initialize(|x| bump.evaluate(x));
    let initial = sim.stats();
    let last = sim.run(config.nsteps);
    assert_relative_eq!(last.sum, initial.sum, max_relative = 1e-12);
}

fn stability_run(table: BoundaryTable, periodic: bool, seed: u64) {
    // D = 1, dx = 0.1, dt = 0.9 * 0.5 * dx²
    let geom = Geometry::new(IndexBox::from_size(&[10]), &[0.0], &[1.0], &[periodic])
        .expect("valid geometry");
    let layout = PatchLayout::chop(&geom, 4, 1).expect("valid layout");
    let engine = UpdateEngine::new(geom, layout, table, Diffusion::new(1.0))
        .expect("valid engine");
    let dt = 0.9 * 0.5 * 0.1 * 0.1;
    assert!(dt < engine.max_stable_dt());

    let mut rng = StdRng::seed_from_u64(seed);
    let mut old = engine.allocate();
    for patch in old.patches_mut() {
        let cells: Vec<_> = patch.valid_box().cells().collect();
        for iv in cells {
            patch.set(&iv, rng.random_range(-1.0..1.0));
        }
    }
    let mut new = engine.allocate();

    let mut previous = old.stats().max_abs;
    for step in 0..100 {
        engine.advance(&mut old, &mut new, dt);
        std::mem::swap(&mut old, &mut new);
        let current = old.stats().max_abs;
        assert!(
            current <= previous + 1e-12,
            "max |phi| grew at step {step}: {previous} -> {current}"
        );
        previous = current;
    }
}

#[test]
fn test_stability_boundary_zero_gradient() {
    stability_run(BoundaryTable::uniform(1, BoundaryKind::ZeroGradient), false, 3);
}

#[test]
fn test_stability_boundary_fixed_value() {
    stability_run(BoundaryTable::uniform(1, BoundaryKind::FixedValue(0.0)), false, 7);
}

#[test]
fn test_stability_boundary_periodic() {
    stability_run(BoundaryTable::periodic(1), true, 5);
}

#[test]
fn test_oversized_step_diverges() {
    // dt is not validated; twice the limit amplifies the checkerboard mode
    let geom = Geometry::new(IndexBox::from_size(&[10]), &[0.0], &[1.0], &[true])
        .expect("valid geometry");
    let layout = PatchLayout::chop(&geom, 10, 1).expect("valid layout");
    let engine = UpdateEngine::new(geom, layout, BoundaryTable::periodic(1), Diffusion::new(1.0))
        .expect("valid engine");
    let dt = 2.0 * engine.max_stable_dt();

    let mut old = engine.allocate();
    for patch in old.patches_mut() {
        let cells: Vec<_> = patch.valid_box().cells().collect();
        for iv in cells {
            patch.set(&iv, if iv[0] % 2 == 0 { 1.0 } else { -1.0 });
        }
    }
    let mut new = engine.allocate();
    for _ in 0..5 {
        engine.advance(&mut old, &mut new, dt);
        std::mem::swap(&mut old, &mut new);
    }
    assert!(old.stats().max_abs > 100.0);
}
