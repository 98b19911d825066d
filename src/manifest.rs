// src/manifest.rs

//! Durable record of installed AUR packages
//!
//! The manifest maps each tracked package name to the version last recorded
//! for it. On disk it is a UTF-8 text file with one `name version` record
//! per line, fields separated by a single space. Names and versions must
//! not contain whitespace; there is no escaping. Mutations are either a
//! single-line append (install path) or a whole-file rewrite
//! (reconciliation path) -- the file is never patched in place.
//!
//! The manifest assumes a single writer. Concurrent invocations of the
//! tool can lose updates; nothing here may be extended to rely on
//! multi-process safety.

use crate::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One tracked package and its last-recorded version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub version: String,
}

impl ManifestEntry {
    /// Create a new manifest entry
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Owner of the manifest file contents
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Create a store backed by the given file path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries in on-disk order.
    ///
    /// Creates the containing directory and an empty backing file on first
    /// use. Lines that do not split into exactly a name and a version are
    /// skipped with a warning.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<ManifestEntry>>` - entries in file order
    pub fn load(&self) -> Result<Vec<ManifestEntry>> {
        self.ensure_exists()?;

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            match parse_line(&line) {
                Some(entry) => entries.push(entry),
                None => {
                    if !line.trim().is_empty() {
                        warn!("Skipping malformed manifest line: {:?}", line);
                    }
                }
            }
        }

        debug!("Loaded {} manifest entries from {}", entries.len(), self.path.display());
        Ok(entries)
    }

    /// Append a single record and flush.
    ///
    /// Does not deduplicate -- the caller must have confirmed via `load`
    /// that no entry with this name exists.
    pub fn append(&self, name: &str, version: &str) -> Result<()> {
        self.ensure_exists()?;

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{} {}", name, version)?;
        file.flush()?;

        debug!("Recorded {} {} in manifest", name, version);
        Ok(())
    }

    /// Truncate the backing file and rewrite every entry in the given order
    pub fn rewrite(&self, entries: &[ManifestEntry]) -> Result<()> {
        self.ensure_exists()?;

        let mut file = File::create(&self.path)?;
        for entry in entries {
            writeln!(file, "{} {}", entry.name, entry.version)?;
        }
        file.flush()?;

        debug!("Rewrote manifest with {} entries", entries.len());
        Ok(())
    }

    /// Drop the entry with the given name, if present.
    ///
    /// # Returns
    ///
    /// * `Result<bool>` - whether an entry was removed
    pub fn remove_entry(&self, name: &str) -> Result<bool> {
        let entries = self.load()?;
        let before = entries.len();
        let remaining: Vec<ManifestEntry> =
            entries.into_iter().filter(|e| e.name != name).collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.rewrite(&remaining)?;
        Ok(true)
    }

    /// Create the containing directory and an empty file if missing
    fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        File::create(&self.path)?;

        debug!("Created empty manifest at {}", self.path.display());
        Ok(())
    }
}

/// Parse one manifest line into an entry. Returns `None` unless the line
/// holds exactly a name and a version.
fn parse_line(line: &str) -> Option<ManifestEntry> {
    let mut fields = line.split_whitespace();
    let name = fields.next()?;
    let version = fields.next()?;

    if fields.next().is_some() {
        return None;
    }

    Some(ManifestEntry::new(name, version))
}
