//! Desktop folder discovery.

use std::path::{Path, PathBuf};
#[cfg(windows)]
use std::process::Command;

/// Token preceding the value in `reg query` output
const REG_STRING_TOKEN: &str = "REG_SZ";

/// Registry key holding the shell folder locations of the current user
#[cfg(windows)]
const SHELL_FOLDERS_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Shell Folders";

/// Result of looking up the desktop folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopLookup {
    Found(PathBuf),
    NotFound,
}

impl DesktopLookup {
    /// Accept `path` only if it is an existing directory
    fn existing(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if path.is_dir() => DesktopLookup::Found(path),
            _ => DesktopLookup::NotFound,
        }
    }
}

/// Find the current user's desktop folder
pub fn locate_desktop() -> DesktopLookup {
    DesktopLookup::existing(query_desktop_path())
}

/// Ask the registry where the desktop lives
#[cfg(windows)]
fn query_desktop_path() -> Option<PathBuf> {
    // output() drains stdout until the child closes it and waits for exit
    let output = Command::new("reg")
        .arg("query")
        .arg(SHELL_FOLDERS_KEY)
        .arg("/v")
        .arg("DESKTOP")
        .output();

    match output {
        Ok(output) if output.status.success() => {
            parse_reg_query_output(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            tracing::debug!("reg query exited with {}", output.status);
            None
        }
        Err(err) => {
            tracing::debug!("reg query could not be run: {}", err);
            None
        }
    }
}

/// XDG user dirs on Linux, ~/Desktop on macOS
#[cfg(not(windows))]
fn query_desktop_path() -> Option<PathBuf> {
    dirs::desktop_dir()
}

/// Extract the value from `reg query ... /v DESKTOP` output.
///
/// The value is whatever follows the first `REG_SZ` token, trimmed.
pub fn parse_reg_query_output(output: &str) -> Option<PathBuf> {
    let index = output.find(REG_STRING_TOKEN)?;
    let value = output[index + REG_STRING_TOKEN.len()..].trim();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Check an explicitly given root the same way a discovered one is checked
pub fn check_root(path: &Path) -> DesktopLookup {
    DesktopLookup::existing(Some(path.to_path_buf()))
}
