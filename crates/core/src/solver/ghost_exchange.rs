//! Ghost exchange between patches
//!
//! Before fluxes are computed every patch's ghost border must hold the current
//! interior values of its neighbours (and of periodic images). The exchange is
//! a global barrier: all sources are read before any ghost cell is written.

use super::boundary::{fill_domain_boundary, BoundaryTable};
use crate::field::MultiField;
use crate::grid::{Geometry, PatchLayout};
use rayon::prelude::*;

/// Service that synchronizes ghost cells across all patches of a field
///
/// The in-process implementation is [`LocalExchange`]; a distributed
/// implementation would ship the same copy table over the network.
pub trait GhostExchange: Send + Sync {
    /// Fill every ghost cell covered by `layout`'s copy table
    fn exchange(&self, layout: &PatchLayout, field: &mut MultiField);
}

/// Ghost exchange between patches held in the same process
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExchange;

impl GhostExchange for LocalExchange {
    fn exchange(&self, layout: &PatchLayout, field: &mut MultiField) {
        // Phase 1: read every incoming value from immutable interiors
        let incoming: Vec<Vec<f64>> = {
            let patches = field.patches();
            (0..patches.len())
                .into_par_iter()
                .map(|p| {
                    let mut buf = Vec::new();
                    for copy in layout.copies(p) {
                        let src = &patches[copy.src];
                        buf.extend(copy.region.cells().map(|iv| {
                            src.get(&[
                                iv[0] + copy.offset[0],
                                iv[1] + copy.offset[1],
                                iv[2] + copy.offset[2],
                            ])
                        }));
                    }
                    buf
                })
                .collect()
        };

        // Phase 2: write ghosts, each patch owned by one worker
        field
            .patches_mut()
            .par_iter_mut()
            .zip(incoming.par_iter())
            .enumerate()
            .for_each(|(p, (patch, values))| {
                let mut values = values.iter();
                for copy in layout.copies(p) {
                    for (iv, &v) in copy.region.cells().zip(values.by_ref()) {
                        patch.set(&iv, v);
                    }
                }
            });
    }
}

/// Refill every ghost cell of `field`
///
/// Runs the exchange (inter-patch and periodic ghosts), then applies the
/// boundary table on each patch's physical edges.
pub fn fill_ghosts<X: GhostExchange + ?Sized>(
    field: &mut MultiField,
    layout: &PatchLayout,
    geometry: &Geometry,
    table: &BoundaryTable,
    exchange: &X,
) {
    exchange.exchange(layout, field);
    field
        .patches_mut()
        .par_iter_mut()
        .for_each(|patch| fill_domain_boundary(patch, geometry, table));
}
