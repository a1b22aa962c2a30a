use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::tempdir;

use tagdex_core::prune::prune;
use tagdex_core::storage::Database;
use tagdex_core::{AppConfig, Indexer, ProgressReporter, PruneReport, SilentReporter};

fn indexer() -> Indexer {
    Indexer::with_database(AppConfig::default(), Database::open_in_memory().unwrap())
}

#[derive(Default)]
struct RecordingReporter {
    removed: Mutex<Vec<String>>,
    completed: Mutex<Vec<PruneReport>>,
}

impl ProgressReporter for RecordingReporter {
    fn on_prune_removed(&self, path: &str) {
        self.removed.lock().unwrap().push(path.to_string());
    }

    fn on_prune_complete(&self, report: &PruneReport) {
        self.completed.lock().unwrap().push(report.clone());
    }
}

#[test]
fn test_deleted_file_is_pruned() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let doomed = root.join("doomed.txt");
    fs::write(&doomed, "short lived").unwrap();
    fs::write(root.join("stays.txt"), "long lived").unwrap();
    let indexer = indexer();
    indexer.scan(vec![root.clone()], &SilentReporter).unwrap();

    fs::remove_file(&doomed).unwrap();
    let reporter = RecordingReporter::default();
    let report = indexer.prune(None, &reporter).unwrap();

    assert_eq!(report.checked, 2);
    assert_eq!(report.pruned, 1);
    assert!(!report.cancelled);
    assert_eq!(
        *reporter.removed.lock().unwrap(),
        vec![doomed.to_str().unwrap().to_string()]
    );
    assert_eq!(reporter.completed.lock().unwrap().len(), 1);
    assert!(!indexer.database().file_exists(doomed.to_str().unwrap()).unwrap());
    assert_eq!(indexer.database().count_files().unwrap(), 1);
}

#[test]
fn test_file_below_replaced_directory_is_pruned() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let sub = root.join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("a.txt"), "a").unwrap();
    let indexer = indexer();
    indexer.scan(vec![root.clone()], &SilentReporter).unwrap();

    fs::remove_dir_all(&sub).unwrap();
    fs::write(&sub, "a file where the directory was").unwrap();
    let report = indexer.prune(None, &SilentReporter).unwrap();

    assert_eq!(report.pruned, 1);
    assert_eq!(indexer.database().count_files().unwrap(), 0);
}

#[test]
fn test_prune_on_intact_tree_removes_nothing() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("b.txt"), "b").unwrap();
    let indexer = indexer();
    indexer.scan(vec![root], &SilentReporter).unwrap();

    let report = indexer.prune(None, &SilentReporter).unwrap();

    assert_eq!(report.checked, 2);
    assert_eq!(report.pruned, 0);
}

#[test]
fn test_path_filter_limits_prune() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let inside = root.join("inside");
    let outside = root.join("outside");
    fs::create_dir_all(&inside).unwrap();
    fs::create_dir_all(&outside).unwrap();
    fs::write(inside.join("a.txt"), "a").unwrap();
    fs::write(outside.join("b.txt"), "b").unwrap();
    let indexer = indexer();
    indexer.scan(vec![root.clone()], &SilentReporter).unwrap();

    fs::remove_file(inside.join("a.txt")).unwrap();
    fs::remove_file(outside.join("b.txt")).unwrap();
    let report = indexer.prune(Some(&inside), &SilentReporter).unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.pruned, 1);
    assert!(indexer
        .database()
        .file_exists(outside.join("b.txt").to_str().unwrap())
        .unwrap());
}

#[test]
fn test_path_filter_does_not_match_sibling_prefix() {
    let db = Database::open_in_memory().unwrap();
    for path in ["/nonexistent/media/a.txt", "/nonexistent/media-old/b.txt"] {
        db.insert_file_if_absent(&tagdex_core::IndexedFile {
            id: 0,
            checksum: "00".into(),
            path: path.into(),
            basename: "x".into(),
            size: 1,
            category: "text".into(),
            mime: "text/plain".into(),
        })
        .unwrap();
    }
    let cancel = AtomicBool::new(false);

    let report = prune(
        &db,
        Some(std::path::Path::new("/nonexistent/media")),
        &cancel,
        &SilentReporter,
    )
    .unwrap();

    assert_eq!(report.pruned, 1);
    assert!(db.file_exists("/nonexistent/media-old/b.txt").unwrap());
}

#[test]
fn test_cancelled_prune_keeps_records_and_reports() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    let indexer = indexer();
    indexer.scan(vec![root.clone()], &SilentReporter).unwrap();
    fs::remove_file(root.join("a.txt")).unwrap();

    indexer.cancel_token().store(true, Ordering::SeqCst);
    let reporter = RecordingReporter::default();
    let report = indexer.prune(None, &reporter).unwrap();

    assert!(report.cancelled);
    assert_eq!(report.pruned, 0);
    assert_eq!(indexer.database().count_files().unwrap(), 1);
    assert_eq!(reporter.completed.lock().unwrap().len(), 1);
}

#[test]
fn test_prune_then_rescan_picks_up_changed_file() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let file = root.join("note.txt");
    fs::write(&file, "abc").unwrap();
    let indexer = indexer();
    indexer.scan(vec![root.clone()], &SilentReporter).unwrap();

    fs::remove_file(&file).unwrap();
    indexer.prune(None, &SilentReporter).unwrap();
    fs::write(&file, "new content").unwrap();
    let report = indexer.scan(vec![root], &SilentReporter).unwrap();

    assert_eq!(report.added, 1);
    let record = indexer
        .database()
        .get_file_by_path(file.to_str().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(record.size, 11);
}
