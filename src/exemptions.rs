//! Exemption list loading from exemptions.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

// Embed the TOML file directly in the binary at compile time
const EXEMPTIONS_TOML: &str = include_str!("../exemptions.toml");

/// One configured exemption: `fileToDelete.<ordinal> = "<fragment>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptionEntry {
    pub ordinal: u32,
    /// Path relative to the maintenance root
    pub fragment: String,
}

/// Ordered list of exemption entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemptionList {
    entries: Vec<ExemptionEntry>,
}

/// Structure to deserialize the exemption list from TOML
#[derive(Debug, Deserialize)]
struct ExemptionConfig {
    #[serde(rename = "fileToDelete", default)]
    file_to_delete: BTreeMap<String, toml::Value>,
}

impl ExemptionList {
    /// Parse an exemption list from TOML content.
    ///
    /// Ordinals are scanned from `fileToDelete.1` upwards by exact key and the
    /// first gap ends the list. Other keys, and values that are not strings,
    /// are ignored.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ExemptionConfig =
            toml::from_str(content).context("Failed to parse exemption TOML")?;

        let mut by_key: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in config.file_to_delete {
            match value {
                toml::Value::String(fragment) => {
                    by_key.insert(key, fragment);
                }
                other => warn!(
                    "Ignoring fileToDelete.{}: expected a string, got {}",
                    key,
                    other.type_str()
                ),
            }
        }

        let mut entries = Vec::new();
        let mut ordinal = 1u32;
        while let Some(fragment) = by_key.get(&ordinal.to_string()) {
            entries.push(ExemptionEntry {
                ordinal,
                fragment: fragment.clone(),
            });
            ordinal += 1;
        }

        Ok(ExemptionList { entries })
    }

    /// The list bundled with the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EXEMPTIONS_TOML).context("Failed to load bundled exemption list")
    }

    pub fn entries(&self) -> &[ExemptionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry against `root`, keeping only paths that currently exist
    pub fn resolve(&self, root: &Path) -> BTreeSet<PathBuf> {
        self.entries
            .iter()
            .map(|entry| root.join(&entry.fragment))
            .filter(|path| fs::symlink_metadata(path).is_ok())
            .collect()
    }
}

impl FromIterator<String> for ExemptionList {
    /// Number fragments from 1 in iteration order
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .zip(1u32..)
            .map(|(fragment, ordinal)| ExemptionEntry { ordinal, fragment })
            .collect();
        ExemptionList { entries }
    }
}

/// Where a maintenance pass gets its exemption list from
pub trait ExemptionSource {
    fn load(&self) -> Result<ExemptionList>;
}

/// The list compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedExemptions;

impl ExemptionSource for EmbeddedExemptions {
    fn load(&self) -> Result<ExemptionList> {
        ExemptionList::embedded()
    }
}

/// A TOML file on disk
#[derive(Debug, Clone)]
pub struct FileExemptions(pub PathBuf);

impl ExemptionSource for FileExemptions {
    fn load(&self) -> Result<ExemptionList> {
        let content = fs::read_to_string(&self.0)
            .with_context(|| format!("Failed to read exemption file {}", self.0.display()))?;
        ExemptionList::from_toml(&content)
            .with_context(|| format!("Invalid exemption file {}", self.0.display()))
    }
}

impl ExemptionSource for ExemptionList {
    fn load(&self) -> Result<ExemptionList> {
        Ok(self.clone())
    }
}
