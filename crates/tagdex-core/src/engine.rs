use crate::classify::{self, Classification};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::hasher::{self, HashAlgorithm};
use crate::progress::{MessageLevel, ProgressReporter};
use crate::scanner::{IgnoreReason, IgnoreRules};
use crate::storage::{Database, IndexedFile};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Number of new files hashed together on the pool before their records
/// are written.
const HASH_BATCH_SIZE: usize = 64;

/// What happened to a single path during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Added,
    AlreadyIndexed,
    Ignored(IgnoreReason),
    /// Disappeared between being listed and being read.
    Vanished,
    /// Resolves to something that is not a regular file, e.g. a FIFO.
    NotAFile,
    UnicodeError,
    PermissionError,
    OtherError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub total: usize,
    pub already_indexed: usize,
    pub ignored: usize,
    pub added: usize,
    pub vanished: usize,
    pub unicode_errors: usize,
    pub permission_errors: usize,
    pub other_errors: usize,
    pub cancelled: bool,
    pub aborted: bool,
    pub duration: Duration,
}

impl ScanReport {
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.total += 1;
        match outcome {
            FileOutcome::Added => self.added += 1,
            FileOutcome::AlreadyIndexed => self.already_indexed += 1,
            FileOutcome::Ignored(_) => self.ignored += 1,
            FileOutcome::Vanished => self.vanished += 1,
            FileOutcome::NotAFile => {}
            FileOutcome::UnicodeError => self.unicode_errors += 1,
            FileOutcome::PermissionError => self.permission_errors += 1,
            FileOutcome::OtherError => self.other_errors += 1,
        }
    }

    pub fn errors(&self) -> usize {
        self.unicode_errors + self.permission_errors + self.other_errors
    }
}

/// A path that passed every cheap check and now needs hashing.
struct Candidate {
    path: PathBuf,
    path_str: String,
    basename: String,
    size: u64,
}

pub struct ScanEngine<'a> {
    db: &'a Database,
    rules: IgnoreRules,
    algorithm: HashAlgorithm,
    buffer_size: usize,
    threads: usize,
    abort_on_permission_error: bool,
    cancel: Arc<AtomicBool>,
}

impl<'a> ScanEngine<'a> {
    pub fn new(config: &AppConfig, db: &'a Database) -> Result<Self> {
        Ok(Self {
            db,
            rules: IgnoreRules::from_config(&config.ignore),
            algorithm: config.hash_algorithm()?,
            buffer_size: config.hash_buf_size,
            threads: config.scan.threads,
            abort_on_permission_error: config.scan.abort_on_hash_permission_error,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_cancel_token(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the scan pipeline over `paths`:
    /// 1. Name, symlink and empty-file rules
    /// 2. Existence check against the index
    /// 3. Batched parallel hashing and classification of new files
    /// 4. Insert of the new records, one transaction per batch
    ///
    /// The report is handed to the reporter even when the run is cancelled,
    /// aborted or fails on the store.
    pub fn scan<I>(&self, paths: I, reporter: &dyn ProgressReporter) -> Result<ScanReport>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let start = Instant::now();
        let mut report = ScanReport::default();
        let result = self.run(paths, reporter, &mut report);
        report.duration = start.elapsed();

        info!(
            "Scan finished in {:.2}s: {} considered, {} added, {} already indexed, {} ignored, {} errors",
            report.duration.as_secs_f64(),
            report.total,
            report.added,
            report.already_indexed,
            report.ignored,
            report.errors(),
        );
        reporter.on_scan_complete(&report);
        result.map(|_| report)
    }

    fn run<I>(
        &self,
        paths: I,
        reporter: &dyn ProgressReporter,
        report: &mut ScanReport,
    ) -> Result<()>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let pool = self.build_pool()?;
        let mut batch: Vec<Candidate> = Vec::with_capacity(HASH_BATCH_SIZE);
        let mut considered = 0usize;

        for path in paths {
            if self.cancel.load(Ordering::Relaxed) {
                report.cancelled = true;
                break;
            }
            considered += 1;
            reporter.on_scan_progress(considered, &path);

            match self.precheck(path)? {
                Ok(candidate) => batch.push(candidate),
                Err(outcome) => report.record(&outcome),
            }

            if batch.len() >= HASH_BATCH_SIZE {
                let pending = std::mem::take(&mut batch);
                if !self.process_batch(pending, pool.as_ref(), reporter, report)? {
                    report.aborted = true;
                    return Ok(());
                }
            }
        }

        if !report.cancelled
            && !batch.is_empty()
            && !self.process_batch(batch, pool.as_ref(), reporter, report)?
        {
            report.aborted = true;
        }
        Ok(())
    }

    fn build_pool(&self) -> Result<Option<rayon::ThreadPool>> {
        if self.threads == 0 {
            return Ok(None);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map(Some)
            .map_err(|e| Error::Config(format!("Cannot start {} hash threads: {}", self.threads, e)))
    }

    /// Everything that can be decided without reading file content. The
    /// outer `Result` carries store failures, the inner one the verdict.
    fn precheck(&self, path: PathBuf) -> Result<std::result::Result<Candidate, FileOutcome>> {
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let lossy_path = path.to_string_lossy().into_owned();

        if let Some(reason) = self.rules.check_name(&lossy_path, &basename) {
            info!("Ignoring {} ({})", lossy_path, reason);
            return Ok(Err(FileOutcome::Ignored(reason)));
        }

        // Empty-file rule before the symlink rule. A size that cannot be
        // read skips the empty check and is classified below.
        let metadata = fs::metadata(&path);
        if let Some(m) = metadata.as_ref().ok().filter(|m| m.is_file()) {
            if let Some(reason) = self.rules.check_size(m.len()) {
                info!("Ignoring {} ({})", lossy_path, reason);
                return Ok(Err(FileOutcome::Ignored(reason)));
            }
        }
        if let Some(reason) = self.rules.check_symlink(&path) {
            info!("Ignoring {} ({})", lossy_path, reason);
            return Ok(Err(FileOutcome::Ignored(reason)));
        }

        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => return Ok(Err(self.io_outcome(&path, &e, "reading metadata of"))),
        };
        if !metadata.is_file() {
            debug!("Skipping {}: not a regular file", lossy_path);
            return Ok(Err(FileOutcome::NotAFile));
        }

        let path_str = match path.to_str() {
            Some(s) => s.to_string(),
            None => {
                warn!("Skipping {}: path is not valid UTF-8", lossy_path);
                return Ok(Err(FileOutcome::UnicodeError));
            }
        };

        if self.db.file_exists(&path_str)? {
            debug!("Already indexed: {}", path_str);
            return Ok(Err(FileOutcome::AlreadyIndexed));
        }

        Ok(Ok(Candidate {
            path,
            path_str,
            basename,
            size: metadata.len(),
        }))
    }

    /// Hash a batch on the pool, then write the results on this thread.
    /// Returns `false` when the run has to stop because of a permission
    /// error and the abort policy is enabled.
    fn process_batch(
        &self,
        batch: Vec<Candidate>,
        pool: Option<&rayon::ThreadPool>,
        reporter: &dyn ProgressReporter,
        report: &mut ScanReport,
    ) -> Result<bool> {
        let (algorithm, buffer_size) = (self.algorithm, self.buffer_size);
        let hash_all = || -> Vec<io::Result<(String, Classification)>> {
            batch
                .par_iter()
                .map(|c| hash_and_classify(&c.path, algorithm, buffer_size))
                .collect()
        };
        let hashed = match pool {
            Some(pool) => pool.install(hash_all),
            None => hash_all(),
        };

        let mut records: Vec<IndexedFile> = Vec::with_capacity(batch.len());
        let mut keep_going = true;

        for (candidate, result) in batch.into_iter().zip(hashed) {
            match result {
                Ok((checksum, classification)) => records.push(IndexedFile {
                    id: 0,
                    checksum,
                    path: candidate.path_str,
                    basename: candidate.basename,
                    size: candidate.size,
                    category: classification.category,
                    mime: classification.mime,
                }),
                Err(e) => {
                    let outcome = self.io_outcome(&candidate.path, &e, "hashing");
                    if outcome == FileOutcome::PermissionError && self.abort_on_permission_error {
                        reporter.on_message(
                            MessageLevel::Fatal,
                            &format!(
                                "Permission denied while hashing {}, aborting scan",
                                candidate.path_str
                            ),
                        );
                        keep_going = false;
                    }
                    report.record(&outcome);
                }
            }
        }

        let inserted = self.db.insert_files_if_absent(&records)?;
        for (record, was_inserted) in records.iter().zip(inserted) {
            if was_inserted {
                debug!("Indexed {} ({})", record.path, record.checksum);
                reporter.on_file_added(&record.path);
                report.record(&FileOutcome::Added);
            } else {
                report.record(&FileOutcome::AlreadyIndexed);
            }
        }

        Ok(keep_going)
    }

    fn io_outcome(&self, path: &Path, err: &io::Error, action: &str) -> FileOutcome {
        match err.kind() {
            // a parent replaced by a file fails with ENOTDIR
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                debug!("{} vanished before {}", path.display(), action);
                FileOutcome::Vanished
            }
            io::ErrorKind::PermissionDenied => {
                error!("Permission denied {} {}", action, path.display());
                FileOutcome::PermissionError
            }
            _ => {
                error!("Error {} {}: {}", action, path.display(), err);
                FileOutcome::OtherError
            }
        }
    }
}

fn hash_and_classify(
    path: &Path,
    algorithm: HashAlgorithm,
    buffer_size: usize,
) -> io::Result<(String, Classification)> {
    let checksum = hasher::hash_file(path, algorithm, buffer_size)?;
    Ok((checksum, classify::classify(path)))
}
