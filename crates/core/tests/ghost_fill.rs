//! Ghost exchange and boundary fill over whole decomposed fields
use patch_heat_core::field::MultiField;
use patch_heat_core::grid::{Geometry, IndexBox, IntVect, PatchLayout};
use patch_heat_core::solver::{
    fill_ghosts, BoundaryKind, BoundaryTable, GhostExchange, LocalExchange, Side,
};
use std::collections::HashMap;

fn seeded_field(layout: &PatchLayout) -> MultiField {
    let mut field = MultiField::new(layout);
    for patch in field.patches_mut() {
        let cells: Vec<IntVect> = patch.valid_box().cells().collect();
        for iv in cells {
            patch.set(&iv, (iv[0] * 7 + iv[1] * 13 + iv[2] * 29) as f64 * 0.1);
        }
    }
    field
}

fn wrap(i: i64, n: i64) -> i64 {
    i.rem_euclid(n)
}

#[test]
fn test_ghost_fill_is_idempotent() {
    let geom = Geometry::new(
        IndexBox::from_size(&[12, 9]),
        &[0.0, 0.0],
        &[1.2, 0.9],
        &[true, false],
    )
    .expect("valid geometry");
    let table = BoundaryTable::periodic(1)
        .with(1, Side::Low, BoundaryKind::LinearExtrapolation)
        .with(1, Side::High, BoundaryKind::FixedValue(3.0));

    for (max_grid_size, ghost) in [(4, 1), (3, 2), (5, 3)] {
        let layout = PatchLayout::chop(&geom, max_grid_size, ghost).expect("valid layout");
        let mut field = seeded_field(&layout);

        fill_ghosts(&mut field, &layout, &geom, &table, &LocalExchange);
        let once: Vec<Vec<f64>> = field
            .patches()
            .iter()
            .map(|p| p.as_slice().to_vec())
            .collect();

        fill_ghosts(&mut field, &layout, &geom, &table, &LocalExchange);
        let twice: Vec<Vec<f64>> = field
            .patches()
            .iter()
            .map(|p| p.as_slice().to_vec())
            .collect();

        assert_eq!(once, twice, "max_grid_size {max_grid_size}, ghost {ghost}");
    }
}

#[test]
fn test_exchanged_ghosts_match_global_values() {
    let geom = Geometry::new(
        IndexBox::from_size(&[10, 6, 4]),
        &[0.0, 0.0, 0.0],
        &[1.0, 1.0, 1.0],
        &[true, true, true],
    )
    .expect("valid geometry");
    let layout = PatchLayout::chop(&geom, 3, 2).expect("valid layout");
    let mut field = seeded_field(&layout);
    let reference = seeded_field(&layout);

    LocalExchange.exchange(&layout, &mut field);

    // Fully periodic: every ghost equals the interior value at its wrapped index
    for patch in field.patches() {
        for iv in patch.grown_box().cells() {
            let wrapped = [wrap(iv[0], 10), wrap(iv[1], 6), wrap(iv[2], 4)];
            let expected = reference
                .value_at(&layout, &wrapped)
                .expect("wrapped index lies in the domain");
            assert_eq!(patch.get(&iv), expected, "cell {iv:?}");
        }
    }
}

#[test]
fn test_interior_untouched_by_fill() {
    let geom = Geometry::new(IndexBox::from_size(&[8, 8]), &[0.0, 0.0], &[1.0, 1.0], &[false, false])
        .expect("valid geometry");
    let layout = PatchLayout::chop(&geom, 3, 1).expect("valid layout");
    let table = BoundaryTable::uniform(2, BoundaryKind::LinearExtrapolation);
    let mut field = seeded_field(&layout);
    let before = field.gather(&geom);
    fill_ghosts(&mut field, &layout, &geom, &table, &LocalExchange);
    assert_eq!(field.gather(&geom), before);
}

#[test]
fn test_periodic_wrap_scenario() {
    let geom = Geometry::new(IndexBox::from_size(&[4]), &[0.0], &[1.0], &[true])
        .expect("valid geometry");
    // One patch per cell so every ghost comes from another patch
    for max_grid_size in [4, 2, 1] {
        let layout = PatchLayout::chop(&geom, max_grid_size, 1).expect("valid layout");
        let mut field = MultiField::new(&layout);
        for patch in field.patches_mut() {
            let cells: Vec<IntVect> = patch.valid_box().cells().collect();
            for iv in cells {
                patch.set(&iv, (iv[0] + 1) as f64);
            }
        }

        fill_ghosts(&mut field, &layout, &geom, &BoundaryTable::periodic(1), &LocalExchange);

        let first = &field.patches()[0];
        let last = &field.patches()[field.len() - 1];
        assert_eq!(first.get(&[-1, 0, 0]), 4.0);
        assert_eq!(last.get(&[4, 0, 0]), 1.0);
    }
}

/// Every cell index held by more than one patch must carry the same value
fn assert_shared_cells_agree(field: &MultiField) {
    let mut seen: HashMap<IntVect, f64> = HashMap::new();
    for patch in field.patches() {
        for iv in patch.grown_box().cells() {
            let v = patch.get(&iv);
            if let Some(&other) = seen.get(&iv) {
                assert_eq!(v, other, "cell {iv:?} disagrees between patches");
            } else {
                seen.insert(iv, v);
            }
        }
    }
}

#[test]
fn test_inset_patch_fills_ghosts_past_the_edge() {
    let geom = Geometry::new(IndexBox::from_size(&[8]), &[0.0], &[1.0], &[false])
        .expect("valid geometry");
    // Patch 1 starts one cell in, so two ghost layers reach cell -1
    let boxes = vec![
        IndexBox::new([0, 0, 0], [0, 0, 0]),
        IndexBox::new([1, 0, 0], [7, 0, 0]),
    ];
    let layout = PatchLayout::new(&geom, boxes, 2).expect("valid layout");

    for kind in [BoundaryKind::ZeroGradient, BoundaryKind::LinearExtrapolation] {
        let mut field = MultiField::with_value(&layout, 5.0);
        for patch in field.patches_mut() {
            let cells: Vec<IntVect> = patch.valid_box().cells().collect();
            for iv in cells {
                patch.set(&iv, (iv[0] + 1) as f64);
            }
        }
        fill_ghosts(&mut field, &layout, &geom, &BoundaryTable::uniform(1, kind), &LocalExchange);

        let expected = match kind {
            BoundaryKind::LinearExtrapolation => 0.0,
            _ => 1.0,
        };
        assert_eq!(field.patches()[0].get(&[-1, 0, 0]), expected);
        assert_eq!(field.patches()[1].get(&[-1, 0, 0]), expected);
        assert_shared_cells_agree(&field);
    }
}

#[test]
fn test_wide_ghosts_agree_across_patches_2d() {
    let geom = Geometry::new(
        IndexBox::from_size(&[9, 7]),
        &[0.0, 0.0],
        &[1.0, 1.0],
        &[false, false],
    )
    .expect("valid geometry");
    let table = BoundaryTable::new()
        .with(0, Side::Low, BoundaryKind::FixedValue(-2.0))
        .with(0, Side::High, BoundaryKind::ZeroGradient)
        .with_axis(1, BoundaryKind::LinearExtrapolation);

    for (max_grid_size, ghost) in [(2, 3), (1, 2), (3, 3)] {
        let layout = PatchLayout::chop(&geom, max_grid_size, ghost).expect("valid layout");
        let mut field = seeded_field(&layout);
        fill_ghosts(&mut field, &layout, &geom, &table, &LocalExchange);
        assert_shared_cells_agree(&field);
    }
}
