pub mod clones;
pub mod query;

pub use clones::{count_duplicate_files, find_clones, CloneGroup, CloneOrder};
pub use query::{find, list, Predicate, SortKey, SortOrder};
