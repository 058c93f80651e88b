//! Upgrade plan assembly.
//!
//! The planner runs every stage in order against one inventory snapshot
//! and produces an immutable [`UpgradePlan`] for the installer.

use log::info;
use serde::Serialize;

use crate::metadata::BottleMetadataSource;
use crate::package::{PackageInventory, PackageName};

use super::closure::{add_outdated_dependents, dependency_closure};
use super::diagnostic::Diagnostic;
use super::outdated::{OutdatedQuery, resolve_outdated};
use super::pins::{PinnedPackage, filter_pinned};
use super::sizing::{SizeTotals, estimate_sizes, format_size, signed};
use super::targets::{Target, select_targets};

/// Options for one planning run
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub query: OutdatedQuery,
    /// Fetch bottle metadata and compute size totals
    pub estimate_sizes: bool,
    /// Add outdated dependents of the closure before sizing
    pub include_dependents: bool,
    /// Report metadata fetches instead of fetching quietly
    pub debug: bool,
    pub dry_run: bool,
}

/// The result of planning. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradePlan {
    targets: Vec<Target>,
    pinned_skipped: Vec<PinnedPackage>,
    sizing_closure: Vec<PackageName>,
    sizes: Option<SizeTotals>,
    dry_run: bool,
    diagnostics: Vec<Diagnostic>,
}

impl UpgradePlan {
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn pinned_skipped(&self) -> &[PinnedPackage] {
        &self.pinned_skipped
    }

    pub fn sizing_closure(&self) -> &[PackageName] {
        &self.sizing_closure
    }

    /// Size totals, when sizing was requested.
    pub fn sizes(&self) -> Option<SizeTotals> {
        self.sizes
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_failures(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_failure)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Text shown before handing the plan off or asking for confirmation.
    pub fn summary(&self) -> String {
        let verb = if self.dry_run {
            "Would upgrade"
        } else {
            "Upgrading"
        };
        let mut lines = vec![format!(
            "==> {} {} outdated package(s):",
            verb,
            self.targets.len()
        )];

        for target in &self.targets {
            if target.is_rename() {
                lines.push(format!(
                    "{} {} -> {} {}",
                    target.name, target.installed_version, target.install_name, target.version
                ));
            } else {
                lines.push(format!(
                    "{} {} -> {}",
                    target.name, target.installed_version, target.version
                ));
            }
        }

        if let Some(sizes) = self.sizes {
            let names: Vec<&str> = self.sizing_closure.iter().map(PackageName::as_str).collect();
            lines.push(format!(
                "==> Packages ({}): {}",
                names.len(),
                names.join(" ")
            ));
            lines.push(format!(
                "==> Download Size: {}",
                format_size(signed(sizes.download))
            ));
            lines.push(format!(
                "==> Install Size: {}",
                format_size(signed(sizes.installed))
            ));
            if sizes.net != 0 {
                lines.push(format!("==> Net Install Size: {}", format_size(sizes.net)));
            }
        }

        lines.join("\n")
    }
}

/// Runs the planning stages against an inventory snapshot.
pub struct UpgradePlanner<'a, I: PackageInventory, S: BottleMetadataSource + ?Sized> {
    inventory: &'a I,
    metadata: &'a S,
}

impl<'a, I: PackageInventory, S: BottleMetadataSource + ?Sized> UpgradePlanner<'a, I, S> {
    pub fn new(inventory: &'a I, metadata: &'a S) -> Self {
        Self {
            inventory,
            metadata,
        }
    }

    /// Compute the upgrade plan. Never installs anything.
    #[tracing::instrument(skip(self))]
    pub async fn plan(&self, options: &PlanOptions) -> UpgradePlan {
        let query = &options.query;

        let outdated = resolve_outdated(self.inventory, query);
        let mut diagnostics = outdated.diagnostics;

        let split = filter_pinned(outdated.candidates, query.is_explicit());
        diagnostics.extend(split.diagnostic);

        let targets = select_targets(self.inventory, &split.unpinned);

        let mut closure = dependency_closure(self.inventory, &targets, query.check_head);
        if options.include_dependents {
            add_outdated_dependents(self.inventory, &mut closure, query.check_head, query.kinds);
        }
        let sizing_closure = closure.into_members();

        let sizes = if options.estimate_sizes && !targets.is_empty() {
            let estimate =
                estimate_sizes(self.inventory, self.metadata, &sizing_closure, !options.debug)
                    .await;
            diagnostics.extend(estimate.diagnostics);
            Some(estimate.totals)
        } else {
            None
        };

        info!(
            "Planned {} target(s), {} pinned, {} sized",
            targets.len(),
            split.pinned.len(),
            sizing_closure.len()
        );

        UpgradePlan {
            targets,
            pinned_skipped: split.pinned,
            sizing_closure,
            sizes,
            dry_run: options.dry_run,
            diagnostics,
        }
    }
}
