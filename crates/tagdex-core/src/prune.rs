use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::storage::Database;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub checked: usize,
    pub pruned: usize,
    pub cancelled: bool,
}

/// Remove every record whose file no longer exists on disk.
///
/// With `path_filter` only records below that directory are checked. Each
/// delete is its own statement, so an interrupted prune leaves a smaller
/// but consistent index. A path is gone when it or one of its parents no
/// longer resolves (`NotFound`, or a parent replaced by a file). A path
/// whose state cannot be determined (e.g. permission denied on a parent)
/// is kept.
pub fn prune(
    db: &Database,
    path_filter: Option<&Path>,
    cancel: &AtomicBool,
    reporter: &dyn ProgressReporter,
) -> Result<PruneReport> {
    let start = Instant::now();
    let mut report = PruneReport::default();
    let result = run(db, path_filter, cancel, reporter, &mut report);

    info!(
        "Prune finished in {:.2}s: {} checked, {} removed",
        start.elapsed().as_secs_f64(),
        report.checked,
        report.pruned,
    );
    reporter.on_prune_complete(&report);
    result.map(|_| report)
}

fn run(
    db: &Database,
    path_filter: Option<&Path>,
    cancel: &AtomicBool,
    reporter: &dyn ProgressReporter,
    report: &mut PruneReport,
) -> Result<()> {
    let records: Vec<_> = db
        .all_files()?
        .into_iter()
        .filter(|f| path_filter.map_or(true, |root| Path::new(&f.path).starts_with(root)))
        .collect();
    let total = records.len();
    reporter.on_prune_start(total);

    for record in records {
        if cancel.load(Ordering::Relaxed) {
            report.cancelled = true;
            break;
        }
        report.checked += 1;
        reporter.on_prune_progress(report.checked, total);

        match fs::symlink_metadata(&record.path) {
            Ok(_) => {}
            Err(e) if is_missing(&e) => {
                if db.delete_file(record.id)? {
                    debug!("Pruned {}", record.path);
                    report.pruned += 1;
                    reporter.on_prune_removed(&record.path);
                }
            }
            Err(e) => warn!("Cannot check {}, keeping it: {}", record.path, e),
        }
    }
    Ok(())
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
