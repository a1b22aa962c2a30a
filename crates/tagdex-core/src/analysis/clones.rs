use crate::error::Result;
use crate::storage::{Database, IndexedFile};
use std::cmp::Reverse;

/// Two or more indexed files with identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneGroup {
    pub checksum: String,
    /// Ordered by path.
    pub files: Vec<IndexedFile>,
}

impl CloneGroup {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Size of one copy.
    pub fn size(&self) -> u64 {
        self.files.first().map_or(0, |f| f.size)
    }

    /// Bytes that would be freed by keeping a single copy.
    pub fn wasted_bytes(&self) -> u64 {
        self.size() * (self.len() as u64).saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloneOrder {
    #[default]
    Checksum,
    WastedBytes,
    Count,
}

/// Group every checksum shared by at least two records.
pub fn find_clones(db: &Database, order: CloneOrder) -> Result<Vec<CloneGroup>> {
    let rows = db.clone_rows()?;
    let mut groups: Vec<CloneGroup> = Vec::new();

    // rows arrive ordered by checksum, then path
    for file in rows {
        match groups.last_mut() {
            Some(group) if group.checksum == file.checksum => group.files.push(file),
            _ => groups.push(CloneGroup {
                checksum: file.checksum.clone(),
                files: vec![file],
            }),
        }
    }

    match order {
        CloneOrder::Checksum => {}
        CloneOrder::WastedBytes => groups.sort_by_key(|g| Reverse(g.wasted_bytes())),
        CloneOrder::Count => groups.sort_by_key(|g| Reverse(g.len())),
    }
    Ok(groups)
}

/// Number of records that have at least one clone.
pub fn count_duplicate_files(db: &Database) -> Result<usize> {
    Ok(db.clone_rows()?.len())
}
