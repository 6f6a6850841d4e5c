//! Patch decomposition and ghost-copy lookup table
//!
//! A [`PatchLayout`] is the output of the decomposition provider: the interior
//! index box of every patch, the ghost width, and a table built once that says
//! which neighbour (or periodic image of a neighbour) fills each piece of every
//! patch's ghost border. Adjacency lives in this table, not in links between
//! patch objects, so patches can be processed in parallel.

use super::geometry::Geometry;
use super::index_box::{IndexBox, IntVect, MAX_DIM};
use crate::error::{ConfigError, ConfigResult};
use tracing::debug;

/// One rectangular piece of a patch's ghost border filled from another patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostCopy {
    /// Index of the patch whose interior supplies the values
    pub src: usize,
    /// Ghost cells of the receiving patch covered by this copy
    pub region: IndexBox,
    /// Cell `iv` of `region` reads cell `iv + offset` of `src`
    pub offset: IntVect,
}

/// Patch boxes, ghost width and neighbour lookup table
#[derive(Debug, Clone)]
pub struct PatchLayout {
    boxes: Vec<IndexBox>,
    ghost: usize,
    ghost_vect: IntVect,
    copies: Vec<Vec<GhostCopy>>,
}

impl PatchLayout {
    /// Validate a decomposition of `geometry`'s domain and build its copy table
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InsufficientGhostWidth`] when `ghost` is zero or wider
    ///   than a periodic axis
    /// - [`ConfigError::Decomposition`] when the boxes leave the domain, overlap
    ///   or leave gaps
    pub fn new(geometry: &Geometry, boxes: Vec<IndexBox>, ghost: usize) -> ConfigResult<Self> {
        if ghost == 0 {
            return Err(ConfigError::InsufficientGhostWidth {
                actual: ghost,
                message: "the two-point flux stencil needs at least one ghost layer".into(),
            });
        }
        for axis in 0..geometry.dim() {
            if geometry.is_periodic(axis) && ghost as i64 > geometry.period(axis) {
                return Err(ConfigError::InsufficientGhostWidth {
                    actual: ghost,
                    message: format!(
                        "wider than periodic axis {axis} ({} cells)",
                        geometry.period(axis)
                    ),
                });
            }
        }

        validate_partition(geometry.domain(), &boxes)?;

        let ghost_vect = geometry.ghost_vect(ghost);
        let copies = build_copy_table(geometry, &boxes, &ghost_vect);

        debug!(
            "Patch layout: {} patches, ghost width {}, {} ghost copies",
            boxes.len(),
            ghost,
            copies.iter().map(Vec::len).sum::<usize>()
        );

        Ok(Self {
            boxes,
            ghost,
            ghost_vect,
            copies,
        })
    }

    /// Split the domain into boxes of at most `max_grid_size` cells per axis
    ///
    /// Chunks are laid out from the low corner; the last chunk along an axis
    /// takes the remainder.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] when `max_grid_size` is zero, plus
    /// everything [`PatchLayout::new`] reports.
    pub fn chop(geometry: &Geometry, max_grid_size: usize, ghost: usize) -> ConfigResult<Self> {
        if max_grid_size == 0 {
            return Err(ConfigError::parameter("max_grid_size", "must be at least 1"));
        }
        // Anything past i64 covers the whole axis anyway
        let size = i64::try_from(max_grid_size).unwrap_or(i64::MAX);
        let domain = geometry.domain();
        let mut ranges: [Vec<(i64, i64)>; MAX_DIM] = Default::default();
        for axis in 0..MAX_DIM {
            if axis >= geometry.dim() {
                ranges[axis].push((domain.lo[axis], domain.hi[axis]));
                continue;
            }
            let mut start = domain.lo[axis];
            while start <= domain.hi[axis] {
                let end = start.saturating_add(size - 1).min(domain.hi[axis]);
                ranges[axis].push((start, end));
                start = end + 1;
            }
        }

        let mut boxes = Vec::new();
        for &(zlo, zhi) in &ranges[2] {
            for &(ylo, yhi) in &ranges[1] {
                for &(xlo, xhi) in &ranges[0] {
                    boxes.push(IndexBox::new([xlo, ylo, zlo], [xhi, yhi, zhi]));
                }
            }
        }
        Self::new(geometry, boxes, ghost)
    }

    /// Interior boxes of all patches
    #[must_use]
    pub fn boxes(&self) -> &[IndexBox] {
        &self.boxes
    }

    /// Number of patches
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Ghost width
    #[must_use]
    pub fn ghost(&self) -> usize {
        self.ghost
    }

    /// Ghost width per axis (zero on inactive axes)
    #[must_use]
    pub fn ghost_vect(&self) -> &IntVect {
        &self.ghost_vect
    }

    /// Ghost copies that fill patch `patch`
    #[must_use]
    pub fn copies(&self, patch: usize) -> &[GhostCopy] {
        &self.copies[patch]
    }

    /// Index of the patch whose interior contains `iv`
    #[must_use]
    pub fn patch_containing(&self, iv: &IntVect) -> Option<usize> {
        self.boxes.iter().position(|b| b.contains(iv))
    }
}

fn validate_partition(domain: &IndexBox, boxes: &[IndexBox]) -> ConfigResult<()> {
    if boxes.is_empty() {
        return Err(ConfigError::Decomposition("no patches".into()));
    }
    for (p, b) in boxes.iter().enumerate() {
        if b.is_empty() {
            return Err(ConfigError::Decomposition(format!("patch {p} {b} is empty")));
        }
        if !domain.contains_box(b) {
            return Err(ConfigError::Decomposition(format!(
                "patch {p} {b} extends outside domain {domain}"
            )));
        }
    }
    for (p, a) in boxes.iter().enumerate() {
        for (q, b) in boxes.iter().enumerate().skip(p + 1) {
            if let Some(overlap) = a.intersect(b) {
                return Err(ConfigError::Decomposition(format!(
                    "patches {p} and {q} overlap on {overlap}"
                )));
            }
        }
    }
    let covered: usize = boxes.iter().map(IndexBox::num_cells).sum();
    if covered != domain.num_cells() {
        return Err(ConfigError::Decomposition(format!(
            "patches cover {covered} of {} domain cells",
            domain.num_cells()
        )));
    }
    Ok(())
}

/// Periodic image offsets: every combination of `-period, 0, +period` on the
/// periodic axes, zero elsewhere. The zero offset comes first.
fn periodic_offsets(geometry: &Geometry) -> Vec<IntVect> {
    let mut offsets = vec![[0; MAX_DIM]];
    for axis in 0..geometry.dim() {
        if !geometry.is_periodic(axis) {
            continue;
        }
        let period = geometry.period(axis);
        let mut next = Vec::with_capacity(offsets.len() * 3);
        for m in [0, -1, 1] {
            for base in &offsets {
                let mut off = *base;
                off[axis] = m * period;
                next.push(off);
            }
        }
        offsets = next;
    }
    offsets
}

fn build_copy_table(
    geometry: &Geometry,
    boxes: &[IndexBox],
    ghost_vect: &IntVect,
) -> Vec<Vec<GhostCopy>> {
    let offsets = periodic_offsets(geometry);
    boxes
        .iter()
        .enumerate()
        .map(|(p, valid)| {
            let grown = valid.grow(ghost_vect);
            let mut copies = Vec::new();
            for offset in &offsets {
                let is_identity = offset.iter().all(|&o| o == 0);
                for (q, src) in boxes.iter().enumerate() {
                    if is_identity && q == p {
                        continue;
                    }
                    let neg = [-offset[0], -offset[1], -offset[2]];
                    if let Some(region) = src.shifted(&neg).intersect(&grown) {
                        copies.push(GhostCopy {
                            src: q,
                            region,
                            offset: *offset,
                        });
                    }
                }
            }
            copies
        })
        .collect()
}
