use anyhow::Result;

use crate::application::{KindFilter, OutdatedQuery, OutdatedSet, resolve_outdated};
use crate::package::{InventorySnapshot, Package, PackageInventory, PackageName};
use crate::runtime::Runtime;

use super::config::{Config, UsageError, Verbosity};

/// Options for the `outdated` command.
#[derive(Debug, Clone, Default)]
pub struct OutdatedOptions {
    pub names: Vec<PackageName>,
    pub fetch_head: bool,
    pub formula: bool,
    pub cask: bool,
    pub verbosity: Verbosity,
}

/// List outdated packages. Returns whether any named package failed.
#[tracing::instrument(skip(runtime, config, options))]
pub fn outdated<R: Runtime>(runtime: &R, config: &Config, options: OutdatedOptions) -> Result<bool> {
    if options.formula && options.cask {
        return Err(UsageError::ConflictingKinds.into());
    }
    let inventory = InventorySnapshot::load(runtime, &config.inventory_path)?;
    Ok(run_outdated(&inventory, &options))
}

pub fn run_outdated<I: PackageInventory>(inventory: &I, options: &OutdatedOptions) -> bool {
    let quiet = options.verbosity.is_quiet();
    let query = OutdatedQuery {
        names: options.names.clone(),
        check_head: options.fetch_head,
        quiet,
        kinds: KindFilter::from_flags(options.formula, options.cask),
    };

    let set = resolve_outdated(inventory, &query);
    for line in render_outdated(&set, quiet, options.fetch_head) {
        println!("{}", line);
    }

    let mut failed = false;
    for diagnostic in &set.diagnostics {
        failed |= diagnostic.is_failure();
        if !quiet || diagnostic.is_failure() {
            eprintln!("{}", diagnostic);
        }
    }
    failed
}

/// One line per candidate: `name installed < latest`, or just the name when quiet.
pub fn render_outdated(set: &OutdatedSet<'_>, quiet: bool, check_head: bool) -> Vec<String> {
    set.candidates
        .iter()
        .map(|package| {
            if quiet {
                return package.name.to_string();
            }
            let mut line = format!(
                "{} {} < {}",
                package.name,
                package.installed_version().unwrap_or_default(),
                latest_version(package, check_head)
            );
            if package.pinned {
                line.push_str(&format!(
                    " [pinned at {}]",
                    package.installed_version().unwrap_or_default()
                ));
            }
            line
        })
        .collect()
}

fn latest_version(package: &Package, check_head: bool) -> String {
    match &package.head_revision {
        Some(rev) if check_head && package.is_head() => format!("HEAD-{}", rev),
        _ => package.version.clone(),
    }
}
