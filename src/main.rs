//! rmrf - A fast, multi-threaded alternative to `rm -rf`.
//!
//! Usage:
//!   rmrf PATH                Delete PATH and everything below it
//!   rmrf -n PATH             Dry run: count what would be deleted
//!   rmrf --json PATH         Print statistics as JSON
//!   rmrf --help              Show help
//!
//! Exit codes: 0 on success, 1 when some entries could not be deleted,
//! 2 when the path was rejected before anything was touched, 130 when
//! interrupted.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use rmrf_engine::{DeleteConfig, DeleteError, DeleteStats, ProgressEvent, TreeDeleter};
use tokio::sync::broadcast;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXIT_PARTIAL: u8 = 1;
const EXIT_REJECTED: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "rmrf",
    version,
    about = "A fast, multi-threaded alternative to rm -rf",
    long_about = "rmrf deletes a directory tree in parallel.\n\n\
                  Known system directories are refused, symbolic links are left \
                  alone by default, and --dry-run shows what would be removed."
)]
struct Cli {
    /// Path to delete
    path: PathBuf,

    /// Maximum number of concurrent subtree tasks (defaults to CPU count)
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u64).range(1..))]
    jobs: Option<u64>,

    /// Count what would be deleted without touching anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Remove symbolic links (never their targets) instead of skipping them
    #[arg(long)]
    follow_symlinks: bool,

    /// List every error and enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Ask for confirmation before deleting
    #[arg(short, long)]
    interactive: bool,

    /// Print statistics as JSON
    #[arg(long)]
    json: bool,

    /// Do not draw the progress line
    #[arg(long)]
    no_progress: bool,

    /// Additional path that must never be deleted (repeatable)
    #[arg(long = "protect", value_name = "PATH")]
    protect: Vec<PathBuf>,
}

impl Cli {
    fn to_config(&self) -> Result<DeleteConfig> {
        let mut builder = DeleteConfig::builder();
        builder
            .dry_run(self.dry_run)
            .skip_symlinks(!self.follow_symlinks)
            .verbose(self.verbose)
            .interactive(self.interactive);
        if let Some(jobs) = self.jobs {
            builder.max_concurrency(jobs as usize);
        }

        let mut config = builder.build().context("Invalid configuration")?;
        for path in &self.protect {
            config = config.protect(path);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(EXIT_REJECTED)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = cli.to_config()?;
    debug!(?config, "Configuration");

    if config.interactive && !config.dry_run && !confirm(&cli.path)? {
        eprintln!("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    let deleter = TreeDeleter::new(config);

    let token = deleter.cancellation_token();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, finishing in-flight removals...");
        token.cancel();
    })
    .context("Failed to set signal handler")?;

    let progress = (!cli.no_progress && !cli.json).then(|| spawn_progress(deleter.subscribe()));

    let result = deleter.delete(&cli.path);

    if let Some(handle) = progress {
        // The completion event ends the thread; a failed root check never sends it.
        if result.is_ok() {
            let _ = handle.join();
        }
    }

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => return Ok(report_rejected(&e)),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(&stats, deleter.config().dry_run, cli.verbose);
    }

    Ok(ExitCode::from(exit_code(&stats)))
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("rmrf=debug,rmrf_engine=debug,warn")
        } else {
            EnvFilter::new("rmrf=info,rmrf_engine=error,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Prompt on stderr and read a yes/no answer from stdin.
fn confirm(path: &Path) -> Result<bool> {
    eprint!("Delete {} and all its contents? [y/N] ", path.display());
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Draw progress on stderr until the run completes.
fn spawn_progress(mut rx: broadcast::Receiver<ProgressEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(ProgressEvent::Update(p)) => {
                    let rate = p
                        .rate()
                        .map(|r| format!("{r:.0}/s"))
                        .unwrap_or_else(|| "-/s".to_string());
                    let eta = p
                        .eta()
                        .map(|d| format!("{:.1}s", d.as_secs_f64()))
                        .unwrap_or_else(|| "-".to_string());
                    eprint!("\rProgress: {}/{} ({rate}, ETA: {eta})   ", p.processed, p.total);
                }
                Ok(ProgressEvent::Complete(p)) => {
                    eprintln!("\rCompleted {} entries in {:.2?}", p.processed, p.elapsed);
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn report_rejected(e: &DeleteError) -> ExitCode {
    eprintln!("Error: {e}");
    ExitCode::from(EXIT_REJECTED)
}

fn print_summary(stats: &DeleteStats, dry_run: bool, verbose: bool) {
    let heading = if dry_run {
        "Dry run complete (nothing was deleted):"
    } else {
        "Deletion complete:"
    };

    println!();
    println!("{heading}");
    println!("- Files: {}", stats.files_deleted);
    println!("- Directories: {}", stats.dirs_deleted);

    if stats.cancelled {
        println!("- Interrupted before completion");
    }

    if !stats.errors.is_empty() {
        println!();
        println!(
            "Encountered {} errors ({} failures):",
            stats.errors.len(),
            stats.failure_count()
        );
        if verbose {
            for err in &stats.errors {
                println!("  - {err}");
            }
        } else {
            println!("  (run with --verbose to list them)");
        }
    }
}

fn exit_code(stats: &DeleteStats) -> u8 {
    if stats.cancelled {
        EXIT_INTERRUPTED
    } else if stats.errors.is_empty() {
        0
    } else {
        EXIT_PARTIAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_maps_to_config() {
        let cli = Cli::parse_from([
            "rmrf",
            "-j",
            "3",
            "--dry-run",
            "--follow-symlinks",
            "--protect",
            "/srv",
            "target",
        ]);
        let config = cli.to_config().unwrap();

        assert_eq!(config.max_concurrency, 3);
        assert!(config.dry_run);
        assert!(!config.skip_symlinks);
        assert!(config.dangerous_paths.contains(&PathBuf::from("/srv")));
        assert!(config.dangerous_paths.contains(&PathBuf::from("/")));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["rmrf", "target"]);
        let config = cli.to_config().unwrap();

        assert!(config.skip_symlinks);
        assert!(!config.dry_run);
        assert!(config.max_concurrency >= 1);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["rmrf", "-j", "0", "target"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let clean = DeleteStats::new();
        assert_eq!(exit_code(&clean), 0);

        let mut partial = DeleteStats::new();
        partial
            .errors
            .push(rmrf_engine::ItemError::symlink_skipped("/tmp/x"));
        assert_eq!(exit_code(&partial), EXIT_PARTIAL);

        let interrupted = DeleteStats {
            cancelled: true,
            ..Default::default()
        };
        assert_eq!(exit_code(&interrupted), EXIT_INTERRUPTED);
    }
}
