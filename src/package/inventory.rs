//! Read-only view of the installed package graph.

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::runtime::Runtime;

use super::{Package, PackageName};

/// Source of the installed package graph consulted while planning.
pub trait PackageInventory {
    /// Every package with at least one installed keg, ordered by name.
    fn installed_packages(&self) -> Vec<&Package>;

    /// Look up any known package, installed or not.
    fn get(&self, name: &PackageName) -> Option<&Package>;
}

#[derive(Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    packages: Vec<Package>,
}

/// Point-in-time snapshot of the package graph.
///
/// The snapshot is loaded once per invocation and never re-read, so every
/// planning stage observes the same state.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    packages: BTreeMap<PackageName, Package>,
}

impl InventorySnapshot {
    /// Build a snapshot from packages, rejecting duplicate identities.
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for package in packages {
            let name = package.name.clone();
            if map.insert(name.clone(), package).is_some() {
                anyhow::bail!("Package {} appears more than once in the inventory", name);
            }
        }
        Ok(Self { packages: map })
    }

    /// Parse a JSON snapshot document: `{ "packages": [...] }`.
    pub fn parse(content: &str) -> Result<Self> {
        let document: SnapshotDocument =
            serde_json::from_str(content).context("Failed to parse inventory snapshot")?;
        Self::from_packages(document.packages)
    }

    /// Load a snapshot document from disk.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        if !runtime.exists(path) {
            anyhow::bail!(
                "Inventory snapshot {:?} does not exist. Pass --inventory or set KEGUP_INVENTORY.",
                path
            );
        }
        let content = runtime.read_to_string(path)?;
        let snapshot =
            Self::parse(&content).with_context(|| format!("Invalid inventory {:?}", path))?;
        debug!(
            "Loaded {} package(s) from {:?}, {} installed",
            snapshot.packages.len(),
            path,
            snapshot.installed_packages().len()
        );
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageInventory for InventorySnapshot {
    fn installed_packages(&self) -> Vec<&Package> {
        self.packages
            .values()
            .filter(|package| package.is_installed())
            .collect()
    }

    fn get(&self, name: &PackageName) -> Option<&Package> {
        self.packages.get(name)
    }
}
