//! Field storage on patches
//!
//! [`PatchField`] is the per-patch array with its ghost border; [`MultiField`]
//! is the collection over a whole decomposition.

mod multi_field;
mod patch_field;

pub use multi_field::{FieldStats, MultiField};
pub use patch_field::PatchField;
