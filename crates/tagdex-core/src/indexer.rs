use crate::analysis::{self, CloneGroup, CloneOrder, Predicate, SortKey, SortOrder};
use crate::config::AppConfig;
use crate::engine::{ScanEngine, ScanReport};
use crate::error::{Error, Result};
use crate::progress::{MessageLevel, ProgressReporter};
use crate::prune::{self, PruneReport};
use crate::scanner;
use crate::storage::{Database, IndexedFile, MediaPath};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub files: i64,
    pub duplicate_files: usize,
    pub total_size: u64,
    pub media_paths: Vec<MediaPath>,
}

/// Configuration, store and cancel token shared by every operation.
pub struct Indexer {
    config: AppConfig,
    db: Database,
    cancel: Arc<AtomicBool>,
}

impl Indexer {
    /// Open (or create) the index configured in `config`.
    pub fn open(config: AppConfig) -> Result<Self> {
        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let db = Database::open(&db_path)?;
        info!("Opened index at {}", db_path.display());
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: AppConfig, db: Database) -> Self {
        Self {
            config,
            db,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Setting the token stops a running scan or prune after the current
    /// file or batch.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Register a root directory. The path is stored absolute and
    /// canonical; registering it twice returns the existing row.
    pub fn add_media_path(&self, path: &Path) -> Result<MediaPath> {
        let absolute = fs::canonicalize(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::MediaPathMissing(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let as_str = absolute
            .to_str()
            .ok_or_else(|| Error::InvalidPath(absolute.clone()))?;
        Ok(self.db.add_media_path(as_str)?)
    }

    pub fn media_paths(&self) -> Result<Vec<MediaPath>> {
        Ok(self.db.list_media_paths()?)
    }

    /// Look up a registered root by id and make sure it is still on disk.
    pub fn resolve_media_path(&self, id: i64) -> Result<MediaPath> {
        let media_path = self
            .db
            .get_media_path(id)?
            .ok_or(Error::UnknownMediaPath(id))?;
        if !Path::new(&media_path.path).exists() {
            return Err(Error::MediaPathMissing(PathBuf::from(&media_path.path)));
        }
        Ok(media_path)
    }

    /// The lazily walked files below `roots`, nested roots walked once.
    pub fn pending_paths(&self, roots: Vec<PathBuf>) -> impl Iterator<Item = PathBuf> {
        scanner::walk_all(scanner::non_overlapping_roots(roots))
    }

    /// Scan the given roots.
    pub fn scan(&self, roots: Vec<PathBuf>, reporter: &dyn ProgressReporter) -> Result<ScanReport> {
        let roots = scanner::non_overlapping_roots(roots);
        info!("Scanning {:?}", roots);
        reporter.on_scan_start(&roots);
        let engine = ScanEngine::new(&self.config, &self.db)?.with_cancel_token(self.cancel_token());
        engine.scan(self.pending_paths(roots), reporter)
    }

    /// Scan every registered root that still exists.
    pub fn scan_all(&self, reporter: &dyn ProgressReporter) -> Result<ScanReport> {
        let mut roots = Vec::new();
        for media_path in self.media_paths()? {
            let root = PathBuf::from(&media_path.path);
            if root.exists() {
                roots.push(root);
            } else {
                let message = format!(
                    "Media-path {} with id {} does not exist on the filesystem (anymore)",
                    media_path.path, media_path.id
                );
                warn!("{}", message);
                reporter.on_message(MessageLevel::Warning, &message);
            }
        }
        self.scan(roots, reporter)
    }

    pub fn prune(
        &self,
        path_filter: Option<&Path>,
        reporter: &dyn ProgressReporter,
    ) -> Result<PruneReport> {
        prune::prune(&self.db, path_filter, &self.cancel, reporter)
    }

    pub fn clones(&self, order: CloneOrder) -> Result<Vec<CloneGroup>> {
        analysis::find_clones(&self.db, order)
    }

    pub fn find(
        &self,
        predicates: &[Predicate],
        sort: SortKey,
        order: SortOrder,
    ) -> Result<Vec<IndexedFile>> {
        analysis::find(&self.db, predicates, sort, order)
    }

    pub fn list(&self, sort: SortKey, order: SortOrder) -> Result<Vec<IndexedFile>> {
        analysis::list(&self.db, sort, order)
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            files: self.db.count_files()?,
            duplicate_files: analysis::count_duplicate_files(&self.db)?,
            total_size: self.db.total_size()?,
            media_paths: self.media_paths()?,
        })
    }
}
