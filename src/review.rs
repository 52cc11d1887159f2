//! Asking a human which leftover daily folders to delete.

use crate::tree::{delete_many_recursive, folder_size, list_content_names};

use anyhow::{Context, Result};
use colored::Colorize;
use humansize::{format_size, BINARY};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maximum number of content names shown per folder
const PREVIEW_MAX_ITEMS: usize = 15;
const PREVIEW_ELLIPSIS: &str = "...";

/// Presentation preferences handed to a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOptions {
    /// Keep the review window above other windows
    pub always_on_top: bool,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        ReviewOptions {
            always_on_top: true,
        }
    }
}

/// Something that lets a human pick folders to delete.
///
/// Implementations call `on_delete` at most once with their selection, which
/// may be empty.
pub trait ReviewGateway {
    fn review(
        &mut self,
        candidates: &BTreeSet<PathBuf>,
        options: ReviewOptions,
        on_delete: &mut dyn FnMut(BTreeSet<PathBuf>),
    ) -> Result<()>;
}

/// What happened to the folders a human selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub deleted: BTreeSet<PathBuf>,
    pub failed: BTreeSet<PathBuf>,
}

/// Run a review session and delete whatever was selected.
///
/// Selections outside `needs_review` are dropped, and only the first
/// callback invocation is honored.
pub fn run_review(
    gateway: &mut dyn ReviewGateway,
    needs_review: &BTreeSet<PathBuf>,
    options: ReviewOptions,
) -> Result<ReviewOutcome> {
    let mut outcome: Option<ReviewOutcome> = None;

    let mut on_delete = |selection: BTreeSet<PathBuf>| {
        if outcome.is_some() {
            warn!("Review already finished, ignoring repeated selection");
            return;
        }

        let (chosen, foreign): (BTreeSet<PathBuf>, BTreeSet<PathBuf>) = selection
            .into_iter()
            .partition(|path| needs_review.contains(path));
        for path in &foreign {
            warn!("Ignoring selection outside the review set: {}", path.display());
        }

        let failed = delete_many_recursive(&chosen);
        for path in &failed {
            warn!("Unable to delete: {}", path.display());
        }
        let deleted = chosen.difference(&failed).cloned().collect();
        outcome = Some(ReviewOutcome { deleted, failed });
    };

    gateway.review(needs_review, options, &mut on_delete)?;

    Ok(outcome.unwrap_or_default())
}

/// Shows a folder to the user outside the terminal
pub type FolderOpener = Box<dyn FnMut(&Path) -> Result<()>>;

/// Open `path` with the platform's default handler (usually the file manager)
pub fn open_in_file_manager(path: &Path) -> Result<()> {
    opener::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Review on a terminal: numbered list out, selection line in.
///
/// `open N` shows candidate N in the file manager and asks again.
pub struct TerminalReview<R, W> {
    input: R,
    output: W,
    opener: FolderOpener,
}

impl<R: BufRead, W: Write> TerminalReview<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalReview {
            input,
            output,
            opener: Box::new(open_in_file_manager),
        }
    }

    /// Replace the handler used by `open N`
    pub fn with_opener(mut self, opener: FolderOpener) -> Self {
        self.opener = opener;
        self
    }

    fn print_candidates(&mut self, candidates: &[&PathBuf]) -> Result<()> {
        writeln!(
            self.output,
            "{}",
            "These daily folders are not empty:".bold()
        )?;

        for (index, folder) in candidates.iter().enumerate() {
            let name = folder
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| folder.display().to_string());
            writeln!(
                self.output,
                "  [{}] {} ({})",
                index + 1,
                name.bold(),
                format_size(folder_size(folder), BINARY)
            )?;

            let content = list_content_names(folder);
            for item in content.iter().take(PREVIEW_MAX_ITEMS) {
                writeln!(self.output, "        {}", item)?;
            }
            if content.len() > PREVIEW_MAX_ITEMS {
                writeln!(self.output, "        {}", PREVIEW_ELLIPSIS)?;
            }
        }
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(
            self.output,
            "Delete which folders? (numbers, 'all', 'open N' to inspect, or Enter to keep all): "
        )?;
        self.output.flush()?;
        Ok(())
    }

    /// Handle `open N`; problems are reported on the terminal, never fatal
    fn open_candidate(&mut self, number: usize, candidates: &[&PathBuf]) -> Result<()> {
        let Some(folder) = number.checked_sub(1).and_then(|i| candidates.get(i)) else {
            writeln!(
                self.output,
                "{} no folder [{}]",
                "Cannot open:".yellow(),
                number
            )?;
            return Ok(());
        };

        if let Err(err) = (self.opener)(folder.as_path()) {
            warn!("{:#}", err);
            writeln!(self.output, "{} {:#}", "Cannot open:".yellow(), err)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> ReviewGateway for TerminalReview<R, W> {
    fn review(
        &mut self,
        candidates: &BTreeSet<PathBuf>,
        options: ReviewOptions,
        on_delete: &mut dyn FnMut(BTreeSet<PathBuf>),
    ) -> Result<()> {
        debug!(
            "Terminal review ignores always_on_top={}",
            options.always_on_top
        );

        let ordered: Vec<&PathBuf> = candidates.iter().collect();
        self.print_candidates(&ordered)?;

        let mut line = String::new();
        loop {
            self.prompt()?;
            line.clear();
            self.input
                .read_line(&mut line)
                .context("Failed to read selection")?;

            match parse_open_command(&line)? {
                Some(number) => self.open_candidate(number, &ordered)?,
                None => break,
            }
        }

        let indices = parse_selection(&line, ordered.len())?;
        let selection: BTreeSet<PathBuf> =
            indices.into_iter().map(|i| ordered[i].clone()).collect();
        on_delete(selection);
        Ok(())
    }
}

/// Recognize `open N` (or `o N`), returning the 1-based number
fn parse_open_command(line: &str) -> Result<Option<usize>> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some(word) if word.eq_ignore_ascii_case("open") || word.eq_ignore_ascii_case("o") => {}
        _ => return Ok(None),
    }

    let (Some(token), None) = (words.next(), words.next()) else {
        anyhow::bail!("Expected 'open N' with a single folder number");
    };
    let number = token
        .parse()
        .with_context(|| format!("Invalid folder number '{}'", token))?;
    Ok(Some(number))
}

/// Parse a selection line into zero-based indices below `count`.
///
/// Accepts an empty line, `n`, `no` or `none` (nothing), `all`, or 1-based numbers
/// separated by whitespace or commas.
pub fn parse_selection(line: &str, count: usize) -> Result<BTreeSet<usize>> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" | "n" | "no" | "none" => return Ok(BTreeSet::new()),
        "a" | "all" => return Ok((0..count).collect()),
        _ => {}
    }

    let mut indices = BTreeSet::new();
    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let number: usize = token
            .parse()
            .with_context(|| format!("Invalid selection '{}'. Expected a number", token))?;
        if number == 0 || number > count {
            anyhow::bail!("Selection {} is out of range 1-{}", number, count);
        }
        indices.insert(number - 1);
    }

    Ok(indices)
}
