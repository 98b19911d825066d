// src/update.rs

//! Version drift detection and manifest reconciliation
//!
//! Drift is a mismatch between the version the system reports for an
//! installed foreign package and the version the registry currently
//! carries. Comparison is exact string inequality; pacman-style versions
//! (epoch, pkgrel) do not follow semver ordering, so no semantic
//! comparison is attempted.

use crate::error::Result;
use crate::manifest::{ManifestEntry, ManifestStore};
use crate::registry::Registry;
use crate::system::SystemQuery;
use tracing::{debug, warn};

/// makepkg emits split debug variants with this suffix; they follow their
/// parent package and are not independently tracked.
const DEBUG_SUFFIX: &str = "-debug";

/// Compute the names of installed foreign packages whose registry version
/// differs from the locally installed one.
///
/// Packages the registry does not know, and packages whose lookup fails,
/// are skipped with a warning -- a single unreachable record must not
/// poison the whole batch. Names are returned in the order the system
/// enumerated them.
pub fn compute_update_candidates<R, S>(registry: &R, system: &S) -> Vec<String>
where
    R: Registry + ?Sized,
    S: SystemQuery + ?Sized,
{
    let mut candidates = Vec::new();

    for package in system.list_foreign() {
        if package.name.ends_with(DEBUG_SUFFIX) {
            debug!("Skipping debug package {}", package.name);
            continue;
        }

        match registry.current_version(&package.name) {
            Ok(Some(remote)) => {
                if remote != package.version {
                    debug!(
                        "{} drifted: installed {} registry {}",
                        package.name, package.version, remote
                    );
                    candidates.push(package.name);
                }
            }
            Ok(None) => {
                warn!("Package {} is not in the AUR, skipping", package.name);
            }
            Err(err) => {
                warn!("Could not query the AUR for {}: {}", package.name, err);
            }
        }
    }

    candidates
}

/// Merge just-upgraded packages into the manifest and rewrite it in full.
///
/// Existing entries keep their relative order; names with no record yet are
/// appended at the end with their now-current registry version. This keeps
/// the manifest converging toward one entry per installed AUR package even
/// if earlier single-install appends were missed.
pub fn sync_manifest_with_installed<R>(
    store: &ManifestStore,
    registry: &R,
    updated: &[String],
) -> Result<()>
where
    R: Registry + ?Sized,
{
    let mut entries = store.load()?;

    for name in updated {
        if entries.iter().any(|entry| &entry.name == name) {
            continue;
        }

        match registry.current_version(name) {
            Ok(Some(version)) => {
                debug!("Adding {} {} to manifest", name, version);
                entries.push(ManifestEntry::new(name.clone(), version));
            }
            Ok(None) => {
                warn!("Updated package {} is not in the AUR, not recording it", name);
            }
            Err(err) => {
                warn!("Could not record {} in manifest: {}", name, err);
            }
        }
    }

    store.rewrite(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::registry::RegistryPackage;
    use crate::system::InstalledPackage;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct FakeRegistry {
        versions: HashMap<String, String>,
        failing: Vec<String>,
    }

    impl FakeRegistry {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                versions: pairs
                    .iter()
                    .map(|(n, v)| (n.to_string(), v.to_string()))
                    .collect(),
                failing: Vec::new(),
            }
        }
    }

    impl Registry for FakeRegistry {
        fn search(&self, _query: &str) -> Vec<RegistryPackage> {
            Vec::new()
        }

        fn current_version(&self, name: &str) -> Result<Option<String>> {
            if self.failing.iter().any(|n| n == name) {
                return Err(Error::Transport("registry unreachable".to_string()));
            }
            Ok(self.versions.get(name).cloned())
        }
    }

    struct FakeSystem {
        installed: Vec<InstalledPackage>,
    }

    impl FakeSystem {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                installed: pairs
                    .iter()
                    .map(|(n, v)| InstalledPackage {
                        name: n.to_string(),
                        version: v.to_string(),
                    })
                    .collect(),
            }
        }
    }

    impl SystemQuery for FakeSystem {
        fn is_installed(&self, name: &str) -> bool {
            self.installed.iter().any(|p| p.name == name)
        }

        fn list_foreign(&self) -> Vec<InstalledPackage> {
            self.installed.clone()
        }
    }

    #[test]
    fn test_drift_flags_only_changed_versions() {
        let registry = FakeRegistry::with(&[("a", "1.0"), ("b", "2.1")]);
        let system = FakeSystem::with(&[("a", "1.0"), ("b", "2.0")]);

        let candidates = compute_update_candidates(&registry, &system);
        assert_eq!(candidates, vec!["b".to_string()]);
    }

    #[test]
    fn test_debug_packages_are_never_candidates() {
        let registry = FakeRegistry::with(&[("foo-debug", "9.9")]);
        let system = FakeSystem::with(&[("foo-debug", "1.0")]);

        let candidates = compute_update_candidates(&registry, &system);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_unknown_package_is_skipped() {
        let registry = FakeRegistry::with(&[("known", "2.0")]);
        let system = FakeSystem::with(&[("unknown", "1.0"), ("known", "1.0")]);

        let candidates = compute_update_candidates(&registry, &system);
        assert_eq!(candidates, vec!["known".to_string()]);
    }

    #[test]
    fn test_transport_failure_skips_only_that_package() {
        let mut registry = FakeRegistry::with(&[("healthy", "2.0")]);
        registry.failing.push("flaky".to_string());
        let system = FakeSystem::with(&[("flaky", "1.0"), ("healthy", "1.0")]);

        let candidates = compute_update_candidates(&registry, &system);
        assert_eq!(candidates, vec!["healthy".to_string()]);
    }

    #[test]
    fn test_candidates_keep_enumeration_order() {
        let registry = FakeRegistry::with(&[("z", "2.0"), ("a", "2.0"), ("m", "2.0")]);
        let system = FakeSystem::with(&[("z", "1.0"), ("a", "1.0"), ("m", "1.0")]);

        let candidates = compute_update_candidates(&registry, &system);
        assert_eq!(candidates, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_sync_appends_missing_entries_in_order() {
        let temp = tempdir().unwrap();
        let store = ManifestStore::new(temp.path().join("packages.list"));
        store.append("existing", "1.0-1").unwrap();

        let registry = FakeRegistry::with(&[("fresh", "3.0-1"), ("existing", "2.0-1")]);
        let updated = vec!["existing".to_string(), "fresh".to_string()];

        sync_manifest_with_installed(&store, &registry, &updated).unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 2);
        // Existing entry keeps its place and its recorded version
        assert_eq!(entries[0], ManifestEntry::new("existing", "1.0-1"));
        // Newly discovered package lands at the end with its current version
        assert_eq!(entries[1], ManifestEntry::new("fresh", "3.0-1"));
    }

    #[test]
    fn test_sync_skips_unresolvable_packages() {
        let temp = tempdir().unwrap();
        let store = ManifestStore::new(temp.path().join("packages.list"));

        let registry = FakeRegistry::with(&[]);
        let updated = vec!["vanished".to_string()];

        sync_manifest_with_installed(&store, &registry, &updated).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
