use std::path::{Path, PathBuf};

use crate::engine::ScanReport;
use crate::prune::PruneReport;

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
    Fatal,
}

/// Output sink for scan and prune runs.
///
/// The CLI implements it with indicatif and colored text; tests and library
/// callers use [`SilentReporter`]. All methods have default no-op
/// implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_message(&self, _level: MessageLevel, _message: &str) {}

    fn on_scan_start(&self, _roots: &[PathBuf]) {}
    fn on_scan_progress(&self, _considered: usize, _current_path: &Path) {}
    fn on_file_added(&self, _path: &str) {}
    /// Always called once per scan, also after cancellation or abort.
    fn on_scan_complete(&self, _report: &ScanReport) {}

    fn on_prune_start(&self, _records: usize) {}
    fn on_prune_progress(&self, _checked: usize, _total: usize) {}
    fn on_prune_removed(&self, _path: &str) {}
    /// Always called once per prune, also after cancellation.
    fn on_prune_complete(&self, _report: &PruneReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
