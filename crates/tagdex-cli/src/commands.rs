use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tagdex_core::{CloneOrder, Predicate, SortKey, SortOrder};

#[derive(Debug, Parser)]
#[command(name = "tagdex", version)]
#[command(about = "Index files by checksum and MIME type, find clones", long_about = None)]
pub struct Cli {
    /// Use the specified configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a directory to media paths (to be scanned later or right away)
    Add(AddArgs),
    /// Scan media paths. Index added files and prune removed files
    #[command(long_about = "Scan media paths. Index added files and prune removed files.\n\n\
        Without --prune or --scan both are done, pruning first.\n\
        Use --path-id to restrict the run to a single media path; \
        see `tagdex info` for the ids.")]
    Updatedb(UpdateDbArgs),
    /// Show files with matching checksums
    Clones(ClonesArgs),
    /// Find files according to certain criteria
    Find(FindArgs),
    /// Show all indexed files
    List(ListArgs),
    /// Show media paths, configuration and statistics for the index
    Info(InfoArgs),
    /// Show version and platform information
    Version,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Directory to register
    pub path: String,
    /// Scan the path now (this may take a long time)
    #[arg(long)]
    pub scan: bool,
    /// Print nothing except fatal errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct UpdateDbArgs {
    /// Prune removed files only; don't scan
    #[arg(long)]
    pub prune: bool,
    /// Scan for new files only; don't prune
    #[arg(long)]
    pub scan: bool,
    /// Prune/scan only files in the media path with this id
    #[arg(short = 'n', long = "path-id", value_name = "ID")]
    pub path_id: Option<i64>,
    /// Display a message for every action
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Display nothing except fatal errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum CloneOrderArg {
    #[default]
    Checksum,
    Wasted,
    Count,
}

impl From<CloneOrderArg> for CloneOrder {
    fn from(arg: CloneOrderArg) -> Self {
        match arg {
            CloneOrderArg::Checksum => CloneOrder::Checksum,
            CloneOrderArg::Wasted => CloneOrder::WastedBytes,
            CloneOrderArg::Count => CloneOrder::Count,
        }
    }
}

#[derive(Debug, Args)]
pub struct ClonesArgs {
    /// Display column with file sizes
    #[arg(short = 's', long)]
    pub show_size: bool,
    /// Display column with media category
    #[arg(short = 't', long)]
    pub show_type: bool,
    /// Display column with MIME type/subtype
    #[arg(short = 'm', long)]
    pub show_mime: bool,
    /// Do not print the "N clones" line after each group
    #[arg(long)]
    pub hide_sum: bool,
    /// Order of the clone groups
    #[arg(long, value_enum, default_value_t = CloneOrderArg::Checksum)]
    pub order: CloneOrderArg,
}

#[derive(Debug, Args)]
pub struct FindArgs {
    /// Match on category (1st part of MIME type)
    #[arg(long, value_name = "CAT")]
    pub cat: Option<String>,
    /// Match files on MIME type
    #[arg(long, value_name = "MIMETYPE")]
    pub mime: Option<String>,
    /// Match files where size is greater than BYTES
    #[arg(long, value_name = "BYTES")]
    pub size_gt: Option<u64>,
    /// Match files where size is less than BYTES
    #[arg(long, value_name = "BYTES")]
    pub size_lt: Option<u64>,
    /// Match files where checksum is (or starts with) HEX
    #[arg(long, value_name = "HEX")]
    pub hash: Option<String>,
    /// Match absolute paths containing STRING
    #[arg(long, value_name = "STRING")]
    pub in_path: Option<String>,
    /// Match file names that are exactly NAME
    #[arg(long, value_name = "NAME", conflicts_with = "in_name")]
    pub name: Option<String>,
    /// Match file names containing STRING
    #[arg(long, value_name = "STRING")]
    pub in_name: Option<String>,
    /// Sort on: path, name, hash, size, cat or mime
    #[arg(short = 'S', long, value_name = "COL", default_value_t = SortKey::Path)]
    pub sort: SortKey,
    /// Reverse the sort order
    #[arg(short, long)]
    pub reverse: bool,
}

impl FindArgs {
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(cat) = &self.cat {
            predicates.push(Predicate::Category(cat.clone()));
        }
        if let Some(mime) = &self.mime {
            predicates.push(Predicate::Mime(mime.clone()));
        }
        if let Some(n) = self.size_gt {
            predicates.push(Predicate::SizeGreaterThan(n));
        }
        if let Some(n) = self.size_lt {
            predicates.push(Predicate::SizeLessThan(n));
        }
        if let Some(hex) = &self.hash {
            predicates.push(Predicate::ChecksumPrefix(hex.clone()));
        }
        if let Some(name) = &self.name {
            predicates.push(Predicate::NameEquals(name.clone()));
        } else if let Some(part) = &self.in_name {
            predicates.push(Predicate::NameContains(part.clone()));
        }
        if let Some(part) = &self.in_path {
            predicates.push(Predicate::PathContains(part.clone()));
        }
        predicates
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Display column with file sizes
    #[arg(short, long)]
    pub size: bool,
    /// Display column with media categories
    #[arg(short, long)]
    pub cat: bool,
    /// Display column with full MIME types
    #[arg(short, long)]
    pub mime: bool,
    /// Sort on: path, name, hash, size, cat or mime
    #[arg(short = 'S', long, value_name = "COL", default_value_t = SortKey::Path)]
    pub sort: SortKey,
    /// Reverse the sort order
    #[arg(short, long)]
    pub reverse: bool,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Print the active configuration
    #[arg(short = 'C', long)]
    pub show_config: bool,
}

pub fn sort_order(reverse: bool) -> SortOrder {
    if reverse {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_find_without_options_has_no_predicates() {
        let cli = Cli::parse_from(["tagdex", "find"]);
        match cli.command {
            Some(Commands::Find(args)) => assert!(args.predicates().is_empty()),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_find_builds_predicates_in_order() {
        let cli = Cli::parse_from(["tagdex", "find", "--cat", "video", "--size-gt", "100", "-S", "size"]);
        match cli.command {
            Some(Commands::Find(args)) => {
                assert_eq!(
                    args.predicates(),
                    vec![
                        Predicate::Category("video".into()),
                        Predicate::SizeGreaterThan(100)
                    ]
                );
                assert_eq!(args.sort, SortKey::Size);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_name_and_in_name_conflict() {
        let result = Cli::try_parse_from(["tagdex", "find", "--name", "a", "--in-name", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_updatedb_path_id() {
        let cli = Cli::parse_from(["tagdex", "updatedb", "-n", "3", "--scan"]);
        match cli.command {
            Some(Commands::Updatedb(args)) => {
                assert_eq!(args.path_id, Some(3));
                assert!(args.scan);
                assert!(!args.prune);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
