// src/pipeline.rs

//! Per-package build and install pipeline
//!
//! Each package runs the sequence clone -> build -> clean -> record,
//! strictly sequentially, aborting on the first failure. A failed clone or
//! build leaves the workspace behind on purpose: the partial checkout and
//! the build logs in it are the only diagnostics the operator gets. Only a
//! successful build removes the workspace.
//!
//! Subprocesses always receive their working directory explicitly; the
//! process-global current directory is never modified.

use crate::error::{Error, Result};
use crate::layout::CacheLayout;
use crate::manifest::{ManifestEntry, ManifestStore};
use crate::registry::Registry;
use crate::system::SystemQuery;
use crate::update;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

/// Base URL for AUR package git repositories
pub const AUR_GIT_URL: &str = "https://aur.archlinux.org";

/// Shell-command boundary of the pipeline: recipe fetching, builds, and
/// the system-wide upgrade. Implemented by `HostCommands` in production
/// and by fakes in tests.
pub trait BuildHost {
    /// Fetch a package's build recipe into the given workspace directory
    fn fetch_recipe(&self, name: &str, workspace: &Path) -> Result<()>;

    /// Build the recipe in the workspace and install the result
    fn build_and_install(&self, workspace: &Path) -> Result<()>;

    /// Run the system-wide package upgrade
    fn upgrade_system(&self) -> Result<()>;
}

/// Real command invocations: git, makepkg, and pacman via sudo.
/// All three inherit the terminal so the user sees progress and prompts.
#[derive(Debug, Default)]
pub struct HostCommands;

impl HostCommands {
    pub fn new() -> Self {
        Self
    }
}

impl BuildHost for HostCommands {
    fn fetch_recipe(&self, name: &str, workspace: &Path) -> Result<()> {
        let url = format!("{}/{}.git", AUR_GIT_URL, name);

        let status = Command::new("git")
            .arg("clone")
            .arg(&url)
            .arg(workspace)
            .status()
            .map_err(|e| Error::Subprocess(format!("failed to run git clone {}: {}", url, e)))?;

        if !status.success() {
            return Err(Error::Subprocess(format!(
                "git clone {} exited with {}",
                url, status
            )));
        }
        Ok(())
    }

    fn build_and_install(&self, workspace: &Path) -> Result<()> {
        let status = Command::new("makepkg")
            .arg("-risc")
            .current_dir(workspace)
            .status()
            .map_err(|e| {
                Error::Subprocess(format!(
                    "failed to run makepkg in {}: {}",
                    workspace.display(),
                    e
                ))
            })?;

        if !status.success() {
            return Err(Error::Subprocess(format!(
                "makepkg in {} exited with {}",
                workspace.display(),
                status
            )));
        }
        Ok(())
    }

    fn upgrade_system(&self) -> Result<()> {
        let status = Command::new("sudo")
            .args(["pacman", "-Syu"])
            .status()
            .map_err(|e| Error::Subprocess(format!("failed to run pacman -Syu: {}", e)))?;

        if !status.success() {
            return Err(Error::Subprocess(format!(
                "system upgrade failed: pacman -Syu exited with {}",
                status
            )));
        }
        Ok(())
    }
}

/// Orchestrates per-package installs and the batch upgrade
pub struct Pipeline<'a, R: Registry, H: BuildHost> {
    registry: &'a R,
    host: &'a H,
    layout: &'a CacheLayout,
    store: &'a ManifestStore,
}

impl<'a, R: Registry, H: BuildHost> Pipeline<'a, R, H> {
    pub fn new(
        registry: &'a R,
        host: &'a H,
        layout: &'a CacheLayout,
        store: &'a ManifestStore,
    ) -> Self {
        Self {
            registry,
            host,
            layout,
            store,
        }
    }

    /// Install one package requested by the user.
    ///
    /// Before any work starts, pending updates across the tracked set are
    /// reported as a purely advisory notice; they never block the install.
    pub fn install<S: SystemQuery>(&self, system: &S, name: &str) -> Result<()> {
        let due = update::compute_update_candidates(self.registry, system);
        if !due.is_empty() {
            warn!(
                "{} tracked package(s) have updates due: {}",
                due.len(),
                due.join(" ")
            );
        }

        self.install_package(name)
    }

    /// Upgrade every candidate in order, aborting the batch on the first
    /// failure.
    ///
    /// Unless `skip_system_upgrade` is set, the system-wide upgrade runs
    /// first; its failure aborts the batch before any per-package work.
    /// On full success the manifest is reconciled over the packages that
    /// were actually updated, and their names are returned.
    pub fn update_all(
        &self,
        candidates: &[String],
        skip_system_upgrade: bool,
    ) -> Result<Vec<String>> {
        if !skip_system_upgrade {
            info!("Running system upgrade");
            self.host.upgrade_system()?;
        }

        let mut updated = Vec::new();
        for name in candidates {
            info!("Updating {}", name);
            if let Err(err) = self.install_package(name) {
                return Err(Error::Subprocess(format!("update of {} failed: {}", name, err)));
            }
            updated.push(name.clone());
        }

        update::sync_manifest_with_installed(self.store, self.registry, &updated)?;
        Ok(updated)
    }

    /// Run the per-package state sequence: resolve version, clone, build,
    /// clean, record.
    fn install_package(&self, name: &str) -> Result<()> {
        // Resolve up front so the recorded version is the registry version
        // at the moment the install started, and unknown names fail fast.
        let version = self
            .registry
            .current_version(name)?
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        self.layout.ensure_root()?;
        let workspace = self.layout.workspace(name);

        info!("Cloning {}", name);
        self.host.fetch_recipe(name, &workspace)?;

        info!("Building {}", name);
        self.host.build_and_install(&workspace)?;

        // Only reached on build success; failed workspaces stay for inspection.
        info!("Cleaning workspace for {}", name);
        fs::remove_dir_all(&workspace)?;

        self.record(name, &version)
    }

    /// Record the installed version in the manifest. A first-time install
    /// appends; a re-install updates the existing entry via full rewrite so
    /// names stay unique.
    fn record(&self, name: &str, version: &str) -> Result<()> {
        let entries = self.store.load()?;

        if entries.iter().any(|entry| entry.name == name) {
            let merged: Vec<ManifestEntry> = entries
                .into_iter()
                .map(|entry| {
                    if entry.name == name {
                        ManifestEntry::new(name, version)
                    } else {
                        entry
                    }
                })
                .collect();
            self.store.rewrite(&merged)
        } else {
            self.store.append(name, version)
        }
    }
}
