use anyhow::Result;
use clap::{ArgAction, Parser};
use colored::Colorize;
use daily_folder::{
    check_root, local_today, locate_desktop, parse_date, run_maintenance_pass, run_review,
    DesktopLookup, EmbeddedExemptions, ExemptionSource, FileExemptions, MaintenanceResult,
    ReviewOptions, TerminalReview,
};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Remove empty daily folders, create today's folder and ask about the rest",
    long_about = None
)]
struct Args {
    /// Keep the review window above other windows
    #[arg(
        long = "alwaysOnTop",
        alias = "always-on-top",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set
    )]
    always_on_top: bool,

    /// Folder holding the daily folders (defaults to the desktop)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Exemption list to use instead of the built-in one
    #[arg(long, value_name = "FILE")]
    exemptions: Option<PathBuf>,

    /// Date to use as today, as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    today: Option<String>,

    /// Only list folders that need review, don't ask
    #[arg(long)]
    no_review: bool,

    /// Show debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Resolve the maintenance root; without one there is nothing to do
fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    match root {
        Some(root) => match check_root(root) {
            DesktopLookup::Found(path) => Ok(path),
            DesktopLookup::NotFound => anyhow::bail!(
                "Root folder {} does not exist or is not a directory",
                root.display()
            ),
        },
        None => match locate_desktop() {
            DesktopLookup::Found(path) => Ok(path),
            DesktopLookup::NotFound => anyhow::bail!(
                "No desktop folder could be found or the configured desktop folder does not exist. Use --root to choose a folder."
            ),
        },
    }
}

fn print_folders(label: &str, folders: &BTreeSet<PathBuf>) {
    for folder in folders {
        println!("  {} {}", label, folder.display());
    }
}

fn print_summary(result: &MaintenanceResult) {
    if result.created_today {
        println!(
            "{} {}",
            "Today's folder:".bold(),
            result.today_folder.display()
        );
    } else {
        println!(
            "{} {}",
            "Unable to create:".bold().red(),
            result.today_folder.display()
        );
    }

    print_folders(&"Pruned:".green().to_string(), &result.pruned);
    print_folders(
        &"Deleted (exempt):".green().to_string(),
        &result.auto_deleted_exempt,
    );
    print_folders(
        &"Unable to delete:".red().to_string(),
        &result.auto_deleted_exempt_failed,
    );
    print_folders(&"Needs review:".yellow().to_string(), &result.needs_review);
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let root = resolve_root(args.root.as_deref())?;
    let today = match args.today.as_deref() {
        Some(date) => parse_date(date)?,
        None => local_today(),
    };

    let source: Box<dyn ExemptionSource> = match args.exemptions {
        Some(path) => Box::new(FileExemptions(path)),
        None => Box::new(EmbeddedExemptions),
    };

    let result = run_maintenance_pass(&root, source.as_ref(), today);
    print_summary(&result);

    if result.needs_review.is_empty() || args.no_review {
        return Ok(());
    }

    let options = ReviewOptions {
        always_on_top: args.always_on_top,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut gateway = TerminalReview::new(stdin.lock(), stdout.lock());
    let outcome = run_review(&mut gateway, &result.needs_review, options)?;
    drop(gateway);

    println!();
    print_folders(&"Deleted:".green().to_string(), &outcome.deleted);
    print_folders(&"Unable to delete:".red().to_string(), &outcome.failed);
    if outcome.deleted.is_empty() && outcome.failed.is_empty() {
        println!("Nothing deleted.");
    }

    Ok(())
}
