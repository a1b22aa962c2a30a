use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid hash-algo \"{0}\" in configuration (expected md5 or sha1)")]
    UnsupportedAlgorithm(String),

    #[error("find requires one or more predicates")]
    NoPredicates,

    #[error("No media-path known with id {0}")]
    UnknownMediaPath(i64),

    #[error("Media-path {} does not exist on the filesystem (anymore)", .0.display())]
    MediaPathMissing(PathBuf),

    #[error("Path cannot be stored in the index: {}", .0.display())]
    InvalidPath(PathBuf),
}
