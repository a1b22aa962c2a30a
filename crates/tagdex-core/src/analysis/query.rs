use crate::error::{Error, Result};
use crate::storage::{Database, IndexedFile};
use rusqlite::types::Value;
use std::fmt;
use std::str::FromStr;

/// One filter condition. Several predicates are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Category(String),
    Mime(String),
    SizeGreaterThan(u64),
    SizeLessThan(u64),
    ChecksumPrefix(String),
    PathContains(String),
    NameEquals(String),
    NameContains(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Path,
    Name,
    Checksum,
    Size,
    Category,
    Mime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl Predicate {
    fn to_sql(&self) -> (&'static str, Value) {
        match self {
            Predicate::Category(cat) => ("category = ?", Value::Text(cat.clone())),
            Predicate::Mime(mime) => ("mime = ?", Value::Text(mime.clone())),
            Predicate::SizeGreaterThan(n) => ("size > ?", Value::Integer(clamp_size(*n))),
            Predicate::SizeLessThan(n) => ("size < ?", Value::Integer(clamp_size(*n))),
            Predicate::ChecksumPrefix(hex) => (
                "checksum LIKE ? ESCAPE '\\'",
                Value::Text(format!("{}%", escape_like(&hex.to_lowercase()))),
            ),
            Predicate::PathContains(s) => (
                "path LIKE ? ESCAPE '\\'",
                Value::Text(format!("%{}%", escape_like(s))),
            ),
            Predicate::NameEquals(name) => ("basename = ?", Value::Text(name.clone())),
            Predicate::NameContains(s) => (
                "basename LIKE ? ESCAPE '\\'",
                Value::Text(format!("%{}%", escape_like(s))),
            ),
        }
    }
}

impl SortKey {
    fn column(self) -> &'static str {
        match self {
            SortKey::Path => "path",
            SortKey::Name => "basename",
            SortKey::Checksum => "checksum",
            SortKey::Size => "size",
            SortKey::Category => "category",
            SortKey::Mime => "mime",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path" => Ok(SortKey::Path),
            "name" => Ok(SortKey::Name),
            "hash" | "checksum" => Ok(SortKey::Checksum),
            "size" => Ok(SortKey::Size),
            "cat" | "category" => Ok(SortKey::Category),
            "mime" => Ok(SortKey::Mime),
            other => Err(format!(
                "unknown sort column \"{}\" (expected path, name, hash, size, cat or mime)",
                other
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Build the WHERE/ORDER BY tail of a file query together with its bound
/// parameters. User input never ends up in the SQL text.
pub(crate) fn build_filter(
    predicates: &[Predicate],
    sort: SortKey,
    order: SortOrder,
) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut params = Vec::with_capacity(predicates.len());

    if !predicates.is_empty() {
        let clauses: Vec<&str> = predicates
            .iter()
            .map(|p| {
                let (clause, value) = p.to_sql();
                params.push(value);
                clause
            })
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push_str(&format!(" ORDER BY {} {}", sort.column(), order.keyword()));
    if sort != SortKey::Path {
        sql.push_str(", path ASC");
    }
    (sql, params)
}

/// Files matching every predicate. At least one predicate is required.
pub fn find(
    db: &Database,
    predicates: &[Predicate],
    sort: SortKey,
    order: SortOrder,
) -> Result<Vec<IndexedFile>> {
    if predicates.is_empty() {
        return Err(Error::NoPredicates);
    }
    Ok(db.select_files(predicates, sort, order)?)
}

/// All indexed files in the requested order.
pub fn list(db: &Database, sort: SortKey, order: SortOrder) -> Result<Vec<IndexedFile>> {
    Ok(db.select_files(&[], sort, order)?)
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn clamp_size(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
