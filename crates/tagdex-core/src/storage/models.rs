use rusqlite::Row;

/// Column list matching [`IndexedFile::from_row`].
pub(crate) const FILE_COLUMNS: &str = "id, checksum, path, basename, size, category, mime";

/// A file in the index. Records are never updated in place; a changed file
/// is only picked up again after its record has been pruned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub id: i64,
    pub checksum: String,
    pub path: String,
    pub basename: String,
    pub size: u64,
    pub category: String,
    pub mime: String,
}

impl IndexedFile {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(IndexedFile {
            id: row.get(0)?,
            checksum: row.get(1)?,
            path: row.get(2)?,
            basename: row.get(3)?,
            size: row.get::<_, i64>(4)? as u64,
            category: row.get(5)?,
            mime: row.get(6)?,
        })
    }

    /// Short checksum prefix used in listings.
    pub fn short_checksum(&self) -> &str {
        let end = self.checksum.len().min(5);
        &self.checksum[..end]
    }
}

/// A registered root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPath {
    pub id: i64,
    pub path: String,
}
