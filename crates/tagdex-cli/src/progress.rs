use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tagdex_core::{MessageLevel, ProgressReporter, PruneReport, ScanReport};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// How much the CLI prints besides the results themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan: spinner with a running count (total unknown upfront)
/// - Prune: progress bar over the indexed records
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
    show_bar: bool,
    verbosity: Verbosity,
}

impl CliReporter {
    pub fn new(load_bar: bool, verbosity: Verbosity) -> Self {
        Self {
            bar: Mutex::new(None),
            show_bar: load_bar
                && verbosity != Verbosity::Quiet
                && console::user_attended_stderr(),
            verbosity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.lock();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.lock().take() {
            pb.finish_and_clear();
        }
    }

    /// Print a line without tearing an active bar.
    fn println(&self, line: String) {
        match self.lock().as_ref() {
            Some(pb) => pb.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    fn quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    fn verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICK_CHARS)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "  {spinner:.cyan} Checking [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━╸─")
    .tick_chars(TICK_CHARS)
}

fn summary_line(label: &str, value: usize) -> String {
    format!("{:<18}{:>12}", label, value)
}

impl ProgressReporter for CliReporter {
    fn on_message(&self, level: MessageLevel, message: &str) {
        if self.quiet() && level < MessageLevel::Fatal {
            return;
        }
        let line = match level {
            MessageLevel::Info => message.normal(),
            MessageLevel::Warning => message.yellow(),
            MessageLevel::Error | MessageLevel::Fatal => message.red().bold(),
        };
        self.println(line.to_string());
    }

    fn on_scan_start(&self, roots: &[PathBuf]) {
        if self.quiet() {
            return;
        }
        eprintln!("{}", "\nSCANNING STARTS".bold());
        if self.verbose() {
            for root in roots {
                eprintln!("- {}", root.display());
            }
        }
        if self.show_bar {
            let pb = ProgressBar::new_spinner();
            pb.set_style(spinner_style());
            pb.set_message("Scanning files...");
            pb.enable_steady_tick(Duration::from_millis(80));
            self.set_bar(pb);
        }
    }

    fn on_scan_progress(&self, considered: usize, _current_path: &Path) {
        if let Some(pb) = self.lock().as_ref() {
            pb.set_message(format!("Scanning... {} files", considered));
        }
    }

    fn on_file_added(&self, path: &str) {
        if self.verbose() {
            self.println(format!("Added {}", path));
        }
    }

    fn on_scan_complete(&self, report: &ScanReport) {
        self.finish_bar();
        if self.quiet() {
            return;
        }
        eprintln!(
            "  {} Scan complete in {:.2}s",
            "✓".green(),
            report.duration.as_secs_f64()
        );
        eprintln!("{}", summary_line("Total files", report.total));
        eprintln!("{}", summary_line("Already indexed", report.already_indexed));
        eprintln!("{}", summary_line("Ignored files", report.ignored));
        eprintln!("{}", summary_line("Newly added", report.added).green());
        if report.vanished > 0 {
            eprintln!("{}", summary_line("Vanished", report.vanished));
        }
        for (label, count) in [
            ("Unicode errors", report.unicode_errors),
            ("Permission errors", report.permission_errors),
            ("Other errors", report.other_errors),
        ] {
            if count > 0 {
                eprintln!("{}", summary_line(label, count).red());
            }
        }
        if report.cancelled {
            eprintln!("{}", "Scan interrupted, the index holds the files added so far".yellow());
        }
        if report.aborted {
            eprintln!("{}", "Scan aborted after a permission error".red().bold());
        }
    }

    fn on_prune_start(&self, records: usize) {
        if self.quiet() {
            return;
        }
        eprintln!("{}", "\nPRUNING STARTS".bold());
        eprintln!("Checking index for entries with missing files...");
        if self.show_bar {
            let pb = ProgressBar::new(records as u64);
            pb.set_style(bar_style());
            pb.enable_steady_tick(Duration::from_millis(80));
            self.set_bar(pb);
        }
    }

    fn on_prune_progress(&self, checked: usize, _total: usize) {
        if let Some(pb) = self.lock().as_ref() {
            pb.set_position(checked as u64);
        }
    }

    fn on_prune_removed(&self, path: &str) {
        if self.verbose() {
            self.println(format!("Removed {}", path));
        }
    }

    fn on_prune_complete(&self, report: &PruneReport) {
        self.finish_bar();
        if self.quiet() {
            return;
        }
        eprintln!(
            "  {} DONE. {} of {} files were removed from the index",
            "✓".green(),
            report.pruned,
            report.checked
        );
        if report.cancelled {
            eprintln!("{}", "Prune interrupted".yellow());
        }
    }
}
