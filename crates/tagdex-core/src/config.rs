use config::{Config, File as ConfigFile, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hasher::HashAlgorithm;

/// Smallest read buffer accepted for hashing.
pub const MIN_HASH_BUF_SIZE: usize = 64;

const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "index.db";
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error", "fatal"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    /// Index database location. Defaults to `<data-home>/index.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// `md5` or `sha1`.
    pub hash_algo: String,
    pub hash_buf_size: usize,
    /// Show a progress bar while scanning.
    pub load_bar: bool,
    pub logging: LoggingConfig,
    pub ignore: IgnoreConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    pub enabled: bool,
    pub file: String,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IgnoreConfig {
    pub empty_files: bool,
    pub symlinks: bool,
    pub name_based: NameBasedIgnore,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NameBasedIgnore {
    /// Substrings matched anywhere in the absolute path.
    pub paths: Vec<String>,
    /// Exact file names.
    pub filenames: Vec<String>,
    /// Suffixes matched against the file name.
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Hashing threads, 0 picks the number of CPUs.
    pub threads: usize,
    /// Stop the whole scan when a file cannot be read while hashing.
    pub abort_on_hash_permission_error: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: None,
            hash_algo: "sha1".to_string(),
            hash_buf_size: 1024,
            load_bar: true,
            logging: LoggingConfig::default(),
            ignore: IgnoreConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: collapse_home(&data_home().join("tagdex.log")),
            level: "warning".to_string(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            empty_files: true,
            symlinks: true,
            name_based: NameBasedIgnore {
                paths: strings(&[
                    "/.git/",
                    "/.hg/",
                    "/.idea/",
                    "/node_modules/",
                    "/__pycache__/",
                    "/.svn/",
                    "/.venv/",
                    "/venv/",
                    "/.virtualenv/",
                ]),
                filenames: strings(&["GPATH", "GRTAGS", "GTAGS", "tags"]),
                extensions: strings(&[
                    ".7z", ".class", ".com", ".dll", ".exe", ".geany", ".gz", ".iso", ".log",
                    ".o", ".pyc", ".rar", ".so", ".sqlite", ".swp", ".tar", ".tgz", ".zip",
                ]),
            },
        }
    }
}

impl AppConfig {
    /// Check every value the core relies on. Called once after loading.
    pub fn validate(&self) -> Result<()> {
        self.hash_algorithm()?;
        if self.hash_buf_size < MIN_HASH_BUF_SIZE {
            return Err(Error::Config(format!(
                "Value for \"hash-buf-size\" must be >= {}",
                MIN_HASH_BUF_SIZE
            )));
        }
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!(
                "Setting \"logging.level\" is not valid.\nValid options are: {}",
                LOG_LEVELS.join(",")
            )));
        }
        Ok(())
    }

    pub fn hash_algorithm(&self) -> Result<HashAlgorithm> {
        self.hash_algo.parse()
    }

    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => expand_tilde(path),
            None => data_home().join(DATABASE_FILE_NAME),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        expand_tilde(&self.logging.file)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Load the configuration file at `path` on top of the built-in defaults.
/// A missing file yields the defaults.
pub fn load_configuration(path: &Path) -> Result<AppConfig> {
    let settings = Config::builder()
        .add_source(
            ConfigFile::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )
        .build()?;
    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    debug!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Write the default configuration to `path` unless a file already exists.
/// Returns whether a file was written.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let header = format!(
        "# config created by tagdex {} at {}\n\
         #\n\
         # A tilde `~` in file paths expands to the home directory.\n\
         # hash-algo can be 'md5' or 'sha1'.\n\
         # Valid logging levels are: 'debug', 'info', 'warning', 'error' or 'fatal'.\n\n",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
    );
    let body = AppConfig::default().to_toml()?;
    fs::write(path, header + &body)?;
    info!("Wrote default configuration to {}", path.display());
    Ok(true)
}

/// Directory holding `config.toml`. Overridable with `TAGDEX_CONFIG_HOME`.
pub fn config_home() -> PathBuf {
    env::var_os("TAGDEX_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tagdex")
        })
}

/// Directory holding the index and the log file. Overridable with `TAGDEX_DATA_HOME`.
pub fn data_home() -> PathBuf {
    env::var_os("TAGDEX_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tagdex")
        })
}

pub fn default_config_path() -> PathBuf {
    config_home().join(CONFIG_FILE_NAME)
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Replace a leading home directory with `~` for display.
pub fn collapse_home(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return Path::new("~").join(rest).to_string_lossy().into_owned();
        }
    }
    path.to_string_lossy().into_owned()
}
