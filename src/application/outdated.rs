//! Determines which installed packages are candidates for upgrading.

use log::debug;
use std::collections::HashSet;

use crate::package::{Package, PackageInventory, PackageKind, PackageName};

use super::diagnostic::{Diagnostic, DiagnosticKind};

/// Which package kinds a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    Any,
    Formula,
    Cask,
}

impl KindFilter {
    /// Filter selected by the `--formula`/`--cask` flags. Both set means any.
    pub fn from_flags(formula: bool, cask: bool) -> Self {
        match (formula, cask) {
            (true, false) => KindFilter::Formula,
            (false, true) => KindFilter::Cask,
            _ => KindFilter::Any,
        }
    }

    pub fn allows(self, kind: PackageKind) -> bool {
        match self {
            KindFilter::Any => true,
            KindFilter::Formula => kind == PackageKind::Formula,
            KindFilter::Cask => kind == PackageKind::Cask,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            KindFilter::Any => "package",
            KindFilter::Formula => "formula",
            KindFilter::Cask => "cask",
        }
    }
}

/// Parameters of an outdated lookup.
#[derive(Debug, Clone, Default)]
pub struct OutdatedQuery {
    /// Explicitly requested packages; empty means every installed package
    pub names: Vec<PackageName>,
    /// Compare head installs against the latest upstream revision
    pub check_head: bool,
    /// Suppress "already installed" advisories
    pub quiet: bool,
    pub kinds: KindFilter,
}

impl OutdatedQuery {
    pub fn is_explicit(&self) -> bool {
        !self.names.is_empty()
    }
}

/// Outdated candidates plus what was noticed while finding them.
#[derive(Debug, Default)]
pub struct OutdatedSet<'a> {
    pub candidates: Vec<&'a Package>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Find the outdated packages a request refers to.
///
/// Named packages that are missing produce a failure, and named packages
/// that are current produce an advisory; neither aborts the lookup.
#[tracing::instrument(skip(inventory))]
pub fn resolve_outdated<'a, I: PackageInventory>(
    inventory: &'a I,
    query: &OutdatedQuery,
) -> OutdatedSet<'a> {
    let mut set = OutdatedSet::default();

    if !query.is_explicit() {
        set.candidates = inventory
            .installed_packages()
            .into_iter()
            .filter(|package| query.kinds.allows(package.kind))
            .filter(|package| package.outdated(query.check_head))
            .collect();
        debug!("Found {} outdated package(s)", set.candidates.len());
        return set;
    }

    let mut seen = HashSet::new();
    for name in &query.names {
        if !seen.insert(name) {
            continue;
        }

        let package = inventory
            .get(name)
            .filter(|package| package.is_installed() && query.kinds.allows(package.kind));
        let Some(package) = package else {
            set.diagnostics.push(Diagnostic::failure(
                DiagnosticKind::NotInstalled,
                format!("No installed {} named {}: not installed", query.kinds.noun(), name),
            ));
            continue;
        };

        if package.outdated(query.check_head) {
            set.candidates.push(package);
        } else if !query.quiet {
            let version = package.installed_version().unwrap_or_default();
            set.diagnostics.push(Diagnostic::advisory(
                DiagnosticKind::AlreadyInstalled,
                format!("{} {} already installed", package.name, version),
            ));
        }
    }

    set
}
