pub mod analysis;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod hasher;
pub mod indexer;
pub mod progress;
pub mod prune;
pub mod scanner;
pub mod storage;

pub use analysis::{CloneGroup, CloneOrder, Predicate, SortKey, SortOrder};
pub use config::AppConfig;
pub use engine::{FileOutcome, ScanEngine, ScanReport};
pub use error::{Error, Result};
pub use indexer::{IndexStats, Indexer};
pub use progress::{MessageLevel, ProgressReporter, SilentReporter};
pub use prune::PruneReport;
pub use storage::{Database, IndexedFile, MediaPath};
