mod commands;
mod logging;
mod progress;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{AddArgs, Cli, ClonesArgs, Commands, FindArgs, InfoArgs, ListArgs, UpdateDbArgs};
use dotenv::dotenv;
use progress::{CliReporter, Verbosity};
use tagdex_core::config::{self, AppConfig};
use tagdex_core::format::{format_size, format_size_padded};
use tagdex_core::{Error, IndexedFile, Indexer};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let code = match run(args) {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("{} {:#}", "error:".red().bold(), err);
            1
        }
    };
    process::exit(code);
}

fn run(args: Cli) -> anyhow::Result<i32> {
    let command = match args.command {
        Some(Commands::Version) => {
            print_version();
            return Ok(0);
        }
        Some(command) => command,
        None => {
            Cli::command().print_long_help()?;
            return Ok(0);
        }
    };

    let config_path = match args.config {
        Some(path) => {
            if !path.exists() {
                eprintln!(
                    "{} configuration file {} does not exist",
                    "error:".red().bold(),
                    path.display()
                );
                return Ok(2);
            }
            path
        }
        None => {
            let path = config::default_config_path();
            config::write_default_config(&path)
                .with_context(|| format!("Cannot write default configuration {}", path.display()))?;
            path
        }
    };
    let config = config::load_configuration(&config_path)
        .with_context(|| format!("Invalid configuration file {}", config_path.display()))?;

    let verbosity = verbosity_of(&command);
    let console_level = match verbosity {
        Verbosity::Quiet => LevelFilter::ERROR,
        Verbosity::Normal => LevelFilter::WARN,
        Verbosity::Verbose => LevelFilter::INFO,
    };
    let _guard = logging::init_logger(&config.logging, &config.log_file(), console_level);
    info!("Using configuration {}", config_path.display());

    let indexer = Indexer::open(config).context("Cannot open the index")?;
    let cancel = indexer.cancel_token();
    ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst))
        .context("Cannot install the Ctrl-C handler")?;

    let reporter = CliReporter::new(indexer.config().load_bar, verbosity);
    match command {
        Commands::Add(args) => run_add(&indexer, &args, &reporter),
        Commands::Updatedb(args) => run_updatedb(&indexer, &args, &reporter),
        Commands::Clones(args) => run_clones(&indexer, &args),
        Commands::Find(args) => run_find(&indexer, &args),
        Commands::List(args) => run_list(&indexer, &args),
        Commands::Info(args) => run_info(&indexer, &args, &config_path),
        Commands::Version => {
            print_version();
            Ok(0)
        }
    }
}

fn verbosity_of(command: &Commands) -> Verbosity {
    match command {
        Commands::Add(args) if args.quiet => Verbosity::Quiet,
        Commands::Updatedb(args) if args.quiet => Verbosity::Quiet,
        Commands::Updatedb(args) if args.verbose => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

fn fatal(message: &str) {
    eprintln!("{}", message.red().bold());
}

fn run_add(indexer: &Indexer, args: &AddArgs, reporter: &CliReporter) -> anyhow::Result<i32> {
    let path = config::expand_tilde(&args.path);
    if !path.exists() {
        eprintln!("Could not add media path: {}", path.display());
        eprintln!("\n{} media path does not exist", "error:".red().bold());
        return Ok(4);
    }

    let media_path = indexer.add_media_path(&path)?;
    if !args.quiet {
        println!("Added media path: {}", media_path.path);
    }
    if args.scan {
        indexer.scan(vec![PathBuf::from(&media_path.path)], reporter)?;
    }
    Ok(0)
}

fn run_updatedb(
    indexer: &Indexer,
    args: &UpdateDbArgs,
    reporter: &CliReporter,
) -> anyhow::Result<i32> {
    let path_filter = match args.path_id {
        Some(id) => match indexer.resolve_media_path(id) {
            Ok(media_path) => Some(PathBuf::from(media_path.path)),
            Err(err @ Error::UnknownMediaPath(_)) => {
                fatal(&err.to_string());
                return Ok(1);
            }
            Err(err @ Error::MediaPathMissing(_)) => {
                fatal(&format!("{} (id {})", err, id));
                return Ok(2);
            }
            Err(err) => return Err(err.into()),
        },
        None => None,
    };

    let (prune, scan) = if args.prune || args.scan {
        (args.prune, args.scan)
    } else {
        (true, true)
    };

    if prune {
        indexer.prune(path_filter.as_deref(), reporter)?;
    }
    if scan && !indexer.cancel_token().load(Ordering::SeqCst) {
        match path_filter {
            Some(root) => indexer.scan(vec![root], reporter)?,
            None => indexer.scan_all(reporter)?,
        };
    }
    Ok(0)
}

fn run_clones(indexer: &Indexer, args: &ClonesArgs) -> anyhow::Result<i32> {
    let groups = indexer.clones(args.order.into())?;

    for (n, group) in groups.iter().enumerate() {
        let highlight = n % 2 == 0;
        for file in &group.files {
            let mut line = String::new();
            if args.show_size {
                line.push_str(&format!(" {}", format_size_padded(file.size)));
            }
            if args.show_type {
                line.push_str(&format!(" {:<11}", file.category));
            }
            if args.show_mime {
                line.push_str(&format!(" {}", file.mime));
            }
            let hash = file.short_checksum();
            if highlight {
                println!("{}{} {}", hash.green(), line, file.path);
            } else {
                println!("{}{} {}", hash.magenta(), line, file.path.bold());
            }
        }
        if !args.hide_sum {
            let summary = format!(
                "  {} clones, {} reclaimable",
                group.len(),
                format_size(group.wasted_bytes())
            );
            println!("{}", summary.dimmed());
        }
    }
    Ok(0)
}

fn run_find(indexer: &Indexer, args: &FindArgs) -> anyhow::Result<i32> {
    let predicates = args.predicates();
    let files = match indexer.find(&predicates, args.sort, commands::sort_order(args.reverse)) {
        Ok(files) => files,
        Err(Error::NoPredicates) => {
            eprintln!("{} command find requires one or more options\n", "error:".red().bold());
            eprintln!("See `tagdex find --help` for the available options.");
            return Ok(1);
        }
        Err(err) => return Err(err.into()),
    };

    for file in &files {
        println!(
            "{}{} {} {}",
            file.short_checksum().green(),
            format!(" {}", format_size_padded(file.size)).white(),
            file.mime,
            file.path
        );
    }
    Ok(0)
}

fn run_list(indexer: &Indexer, args: &ListArgs) -> anyhow::Result<i32> {
    let files = indexer.list(args.sort, commands::sort_order(args.reverse))?;
    for file in &files {
        println!("{}", list_line(file, args));
    }
    Ok(0)
}

fn list_line(file: &IndexedFile, args: &ListArgs) -> String {
    let mut columns = file.short_checksum().to_string();
    if args.size {
        columns.push_str(&format!(" {}", format_size_padded(file.size)));
    }
    let mut line = columns.green().to_string();
    if args.cat {
        line.push_str(&format!(" {:<11}", file.category));
    }
    if args.mime {
        line.push_str(&format!(" {}", file.mime));
    }
    line.push(' ');
    line.push_str(&file.path);
    line
}

fn run_info(indexer: &Indexer, args: &InfoArgs, config_path: &Path) -> anyhow::Result<i32> {
    if args.show_config {
        print_config(indexer.config(), config_path)?;
        return Ok(0);
    }

    let stats = indexer.stats()?;
    println!("{}", "INDEX STATS".bold());
    println!("files indexed     {:>12}", stats.files);
    println!("duplicate files   {:>12}", stats.duplicate_files);
    println!("total size        {:>12}", format_size(stats.total_size));

    println!(
        "\n{} ({}):",
        "MEDIA PATHS".bold(),
        stats.media_paths.len().to_string().green()
    );
    for media_path in &stats.media_paths {
        println!("{:>4}  {}", media_path.id, media_path.path);
    }
    Ok(0)
}

fn print_config(config: &AppConfig, config_path: &Path) -> anyhow::Result<()> {
    println!("{}", "USER CONFIG".bold());
    println!("file: {}", config::collapse_home(config_path));
    println!("index: {}\n", config::collapse_home(&config.database_path()));
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_version() {
    println!("tagdex {}", env!("CARGO_PKG_VERSION"));
    println!(
        "\nPlatform is {}/{} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::env::consts::FAMILY
    );
}
