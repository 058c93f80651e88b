use anyhow::Result;
use log::{debug, info};

use crate::application::{
    Confirmation, OutdatedQuery, PlanOptions, UpgradePlan, UpgradePlanner, confirm_plan,
};
use crate::metadata::BottleMetadataSource;
use crate::package::{InventorySnapshot, PackageInventory};
use crate::runtime::Runtime;

use super::config::{Config, UpgradeOptions, Verbosity};
use super::handoff::{DependentsChecker, HandoffWriter, Installer};
use super::services::Services;

/// How an upgrade run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Nothing to upgrade
    UpToDate,
    /// The user declined the confirmation prompt
    Aborted,
    /// The plan was passed to the installer
    HandedOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeReport {
    pub outcome: UpgradeOutcome,
    /// Some named package failed; the process should exit non-zero
    pub failed: bool,
}

#[tracing::instrument(skip(runtime, config, options))]
pub async fn upgrade<R: Runtime>(
    runtime: &R,
    config: &Config,
    options: UpgradeOptions,
) -> Result<UpgradeReport> {
    options.validate()?;

    let inventory = InventorySnapshot::load(runtime, &config.inventory_path)?;
    let services = Services::from_config(config)?;
    let writer = HandoffWriter::new(runtime, options.handoff.clone());

    run_upgrade(
        runtime,
        config,
        &options,
        &inventory,
        &services.metadata,
        &writer,
        &writer,
    )
    .await
}

/// Plan against `inventory` and hand the result to the collaborators.
#[tracing::instrument(skip_all)]
pub async fn run_upgrade<R, I, S, In, D>(
    runtime: &R,
    config: &Config,
    options: &UpgradeOptions,
    inventory: &I,
    metadata: &S,
    installer: &In,
    dependents: &D,
) -> Result<UpgradeReport>
where
    R: Runtime + ?Sized,
    I: PackageInventory,
    S: BottleMetadataSource + ?Sized,
    In: Installer + ?Sized,
    D: DependentsChecker + ?Sized,
{
    options.validate()?;

    let quiet = options.verbosity.is_quiet();
    let plan_options = PlanOptions {
        query: OutdatedQuery {
            names: options.names.clone(),
            check_head: options.fetch_head,
            quiet,
            kinds: options.kinds(),
        },
        estimate_sizes: options.ask,
        include_dependents: !config.toggles.no_dependents_check,
        debug: options.verbosity == Verbosity::Debug || config.toggles.developer,
        dry_run: options.dry_run,
    };

    let plan = UpgradePlanner::new(inventory, metadata)
        .plan(&plan_options)
        .await;
    report_diagnostics(&plan, quiet);
    let failed = plan.has_failures();

    if plan.is_empty() {
        debug!("No targets to upgrade");
        return Ok(UpgradeReport {
            outcome: UpgradeOutcome::UpToDate,
            failed,
        });
    }

    if options.ask {
        if confirm_plan(runtime, &plan)? == Confirmation::Abort {
            info!("Upgrade declined by user");
            return Ok(UpgradeReport {
                outcome: UpgradeOutcome::Aborted,
                failed,
            });
        }
    } else if !quiet {
        println!("{}", plan.summary());
    }

    let install_config = options.install_config(config.toggles);
    installer.install(plan.targets(), &install_config)?;

    if config.toggles.no_dependents_check {
        debug!("Skipping installed dependents check");
    } else {
        dependents.check_dependents(plan.targets(), &install_config)?;
    }

    Ok(UpgradeReport {
        outcome: UpgradeOutcome::HandedOff,
        failed,
    })
}

fn report_diagnostics(plan: &UpgradePlan, quiet: bool) {
    for diagnostic in plan.diagnostics() {
        if quiet && !diagnostic.is_failure() {
            continue;
        }
        eprintln!("{}", diagnostic);
    }
}
