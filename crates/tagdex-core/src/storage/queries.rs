use super::models::*;
use super::sqlite::Database;
use crate::analysis::query::{build_filter, Predicate, SortKey, SortOrder};
use rusqlite::{params, params_from_iter, Result};
use tracing::debug;

impl Database {
    // ── Media Paths ──────────────────────────────────────────────

    /// Find-or-create a media path row.
    pub fn add_media_path(&self, path: &str) -> Result<MediaPath> {
        let inserted = self.connection().execute(
            "INSERT INTO media_path (path) VALUES (?1) ON CONFLICT(path) DO NOTHING",
            params![path],
        )?;
        if inserted > 0 {
            debug!("Registered media path {}", path);
        }
        self.connection().query_row(
            "SELECT id, path FROM media_path WHERE path = ?1",
            params![path],
            |row| {
                Ok(MediaPath {
                    id: row.get(0)?,
                    path: row.get(1)?,
                })
            },
        )
    }

    pub fn get_media_path(&self, id: i64) -> Result<Option<MediaPath>> {
        match self.connection().query_row(
            "SELECT id, path FROM media_path WHERE id = ?1",
            params![id],
            |row| {
                Ok(MediaPath {
                    id: row.get(0)?,
                    path: row.get(1)?,
                })
            },
        ) {
            Ok(media_path) => Ok(Some(media_path)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_media_paths(&self) -> Result<Vec<MediaPath>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id, path FROM media_path ORDER BY id")?;
        let paths = stmt
            .query_map([], |row| {
                Ok(MediaPath {
                    id: row.get(0)?,
                    path: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(paths)
    }

    // ── Indexed Files ────────────────────────────────────────────

    /// Insert every record whose path is not yet indexed, in one transaction.
    /// Returns, per input record, whether it was inserted.
    pub fn insert_files_if_absent(&self, files: &[IndexedFile]) -> Result<Vec<bool>> {
        let tx = self.connection().unchecked_transaction()?;
        let mut inserted = Vec::with_capacity(files.len());
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO indexed_file (checksum, path, basename, size, category, mime) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(path) DO NOTHING",
            )?;
            for file in files {
                let changed = stmt.execute(params![
                    file.checksum,
                    file.path,
                    file.basename,
                    file.size as i64,
                    file.category,
                    file.mime,
                ])?;
                inserted.push(changed > 0);
            }
        }
        tx.commit()?;
        debug!(
            "Inserted {} of {} indexed files",
            inserted.iter().filter(|i| **i).count(),
            files.len()
        );
        Ok(inserted)
    }

    /// Insert a single record unless its path is already indexed.
    /// Returns the new id, or `None` when the path was present.
    pub fn insert_file_if_absent(&self, file: &IndexedFile) -> Result<Option<i64>> {
        let changed = self.connection().execute(
            "INSERT INTO indexed_file (checksum, path, basename, size, category, mime) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(path) DO NOTHING",
            params![
                file.checksum,
                file.path,
                file.basename,
                file.size as i64,
                file.category,
                file.mime,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(self.connection().last_insert_rowid()))
    }

    pub fn file_exists(&self, path: &str) -> Result<bool> {
        let mut stmt = self
            .connection()
            .prepare_cached("SELECT 1 FROM indexed_file WHERE path = ?1 LIMIT 1")?;
        stmt.exists(params![path])
    }

    pub fn get_file_by_path(&self, path: &str) -> Result<Option<IndexedFile>> {
        let sql = format!("SELECT {} FROM indexed_file WHERE path = ?1", FILE_COLUMNS);
        match self
            .connection()
            .query_row(&sql, params![path], IndexedFile::from_row)
        {
            Ok(file) => Ok(Some(file)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn delete_file(&self, id: i64) -> Result<bool> {
        let changed = self
            .connection()
            .execute("DELETE FROM indexed_file WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn all_files(&self) -> Result<Vec<IndexedFile>> {
        let sql = format!("SELECT {} FROM indexed_file ORDER BY path", FILE_COLUMNS);
        let mut stmt = self.connection().prepare(&sql)?;
        let files = stmt
            .query_map([], IndexedFile::from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(files)
    }

    pub fn count_files(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM indexed_file", [], |row| row.get(0))
    }

    pub fn total_size(&self) -> Result<u64> {
        let total: i64 = self.connection().query_row(
            "SELECT COALESCE(SUM(size), 0) FROM indexed_file",
            [],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }

    /// Files matching all `predicates` (none means every file), sorted on
    /// `sort` with ties broken by path.
    pub fn select_files(
        &self,
        predicates: &[Predicate],
        sort: SortKey,
        order: SortOrder,
    ) -> Result<Vec<IndexedFile>> {
        let (filter, values) = build_filter(predicates, sort, order);
        let sql = format!("SELECT {} FROM indexed_file{}", FILE_COLUMNS, filter);
        debug!("Built file query: {}", sql);
        let mut stmt = self.connection().prepare(&sql)?;
        let files = stmt
            .query_map(params_from_iter(values), IndexedFile::from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(files)
    }

    /// Every record whose checksum is shared with at least one other
    /// record, ordered by checksum then path.
    pub fn clone_rows(&self) -> Result<Vec<IndexedFile>> {
        let sql = format!(
            "SELECT {} FROM indexed_file \
             WHERE checksum IN ( \
                 SELECT checksum FROM indexed_file \
                 GROUP BY checksum HAVING COUNT(*) > 1 \
             ) \
             ORDER BY checksum, path",
            FILE_COLUMNS
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let files = stmt
            .query_map([], IndexedFile::from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(files)
    }
}
