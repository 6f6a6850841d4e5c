//! Grid description: index boxes, geometry and patch decomposition

pub mod geometry;
pub mod index_box;
pub mod layout;

// Re-export main types
pub use geometry::Geometry;
pub use index_box::{IndexBox, IntVect, MAX_DIM};
pub use layout::{GhostCopy, PatchLayout};
