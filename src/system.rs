// src/system.rs

//! System package manager adapter
//!
//! Read-only queries go through the `SystemQuery` trait so the update
//! detector and search annotation can be exercised against fakes. The
//! mutating operations (package removal) stay on the concrete `Pacman`
//! adapter; they inherit the terminal so pacman can prompt.

use crate::error::{Error, Result};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// One installed package as reported by the system package manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

/// Read-only queries against the system package database
pub trait SystemQuery {
    /// Whether a package with this exact name is currently installed.
    /// Inability to run the query counts as not installed.
    fn is_installed(&self, name: &str) -> bool;

    /// All installed packages that do not belong to the official
    /// repositories, with their reported versions, in enumeration order.
    fn list_foreign(&self) -> Vec<InstalledPackage>;
}

/// Adapter around the pacman binary
#[derive(Debug, Default)]
pub struct Pacman;

impl Pacman {
    pub fn new() -> Self {
        Self
    }

    /// Remove an installed package (`sudo pacman -R`). Interactive; pacman
    /// inherits the terminal for its confirmation prompt.
    pub fn remove(&self, name: &str) -> Result<()> {
        let status = Command::new("sudo")
            .args(["pacman", "-R", name])
            .status()
            .map_err(|e| Error::Subprocess(format!("failed to run pacman -R {}: {}", name, e)))?;

        if !status.success() {
            return Err(Error::Subprocess(format!(
                "pacman -R {} exited with {}",
                name, status
            )));
        }
        Ok(())
    }
}

impl SystemQuery for Pacman {
    fn is_installed(&self, name: &str) -> bool {
        let result = Command::new("pacman")
            .args(["-Q", name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) => status.success(),
            Err(err) => {
                warn!("Could not run pacman -Q {}: {}", name, err);
                false
            }
        }
    }

    fn list_foreign(&self) -> Vec<InstalledPackage> {
        let output = match Command::new("pacman").arg("-Qm").output() {
            Ok(output) => output,
            Err(err) => {
                warn!("Could not run pacman -Qm: {}", err);
                return Vec::new();
            }
        };

        if !output.status.success() {
            warn!("pacman -Qm exited with {}", output.status);
            return Vec::new();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let packages = parse_foreign_list(&stdout);
        debug!("Found {} foreign packages", packages.len());
        packages
    }
}

/// Parse `pacman -Qm` output: one `name version` pair per line.
/// Malformed lines are skipped.
fn parse_foreign_list(stdout: &str) -> Vec<InstalledPackage> {
    let mut packages = Vec::new();

    for line in stdout.lines() {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(name), Some(version), None) => packages.push(InstalledPackage {
                name: name.to_string(),
                version: version.to_string(),
            }),
            _ => {
                if !line.trim().is_empty() {
                    debug!("Skipping malformed package line: {:?}", line);
                }
            }
        }
    }

    packages
}
