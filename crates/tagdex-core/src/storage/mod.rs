pub mod models;
mod queries;
mod sqlite;

pub use models::{IndexedFile, MediaPath};
pub use sqlite::Database;
