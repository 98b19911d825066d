// src/layout.rs

//! Filesystem layout for Forager's private cache
//!
//! All paths the tool touches live under one cache root:
//! - per-package build workspaces directly under the root
//! - the install manifest under `installed/`
//!
//! Paths are always passed explicitly to subprocesses; the process
//! working directory is never changed.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolved cache directory layout
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Resolve the default layout under the user's cache directory
    /// (`~/.cache/forager` on Linux).
    pub fn new() -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| Error::Init("could not determine the user cache directory".to_string()))?;

        Ok(Self {
            root: cache_dir.join("forager"),
        })
    }

    /// Create a layout rooted at an explicit directory
    pub fn at(root: PathBuf) -> Self {
        Self { root }
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the install manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("installed").join("packages.list")
    }

    /// Per-package build workspace directory
    pub fn workspace(&self, package: &str) -> PathBuf {
        self.root.join(package)
    }

    /// Create the cache root if it does not exist yet. Idempotent.
    pub fn ensure_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            debug!("Creating cache root at {}", self.root.display());
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }
}
