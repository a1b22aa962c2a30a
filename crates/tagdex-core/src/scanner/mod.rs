pub mod ignore;
pub mod walk;

pub use ignore::{IgnoreReason, IgnoreRules};
pub use walk::{non_overlapping_roots, walk, walk_all};
