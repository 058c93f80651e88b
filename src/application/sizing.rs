//! Download, installed and net size of an upgrade.

use log::{debug, warn};
use serde::Serialize;

use crate::metadata::BottleMetadataSource;
use crate::package::{PackageInventory, PackageName};

use super::diagnostic::{Diagnostic, DiagnosticKind};

/// Aggregated sizes in bytes. `net` is negative when the upgrade frees space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeTotals {
    pub download: u64,
    pub installed: u64,
    pub net: i64,
}

#[derive(Debug, Default)]
pub struct SizeEstimate {
    pub totals: SizeTotals,
    pub diagnostics: Vec<Diagnostic>,
}

/// Sum bottle sizes over the closure, one metadata fetch at a time.
///
/// Members without a bottle add nothing, which understates the totals when
/// packages must be built from source. A failed fetch only drops that
/// member's contribution.
#[tracing::instrument(skip(inventory, source, closure))]
pub async fn estimate_sizes<I, S>(
    inventory: &I,
    source: &S,
    closure: &[PackageName],
    quiet: bool,
) -> SizeEstimate
where
    I: PackageInventory,
    S: BottleMetadataSource + ?Sized,
{
    let mut estimate = SizeEstimate::default();

    for name in closure {
        let Some(package) = inventory.get(name) else {
            continue;
        };
        if !package.is_bottled() {
            debug!("{} has no bottle, size unknown", name);
            continue;
        }

        let metadata = match source.fetch_bottle_metadata(package, quiet).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping size of {}: {:#}", name, e);
                estimate.diagnostics.push(Diagnostic::advisory(
                    DiagnosticKind::MetadataUnavailable,
                    format!("Could not determine the size of {}: {:#}", name, e),
                ));
                continue;
            }
        };

        let totals = &mut estimate.totals;
        totals.download = totals.download.saturating_add(metadata.download_size);
        totals.installed = totals.installed.saturating_add(metadata.installed_size);
        if package.is_installed() {
            let freed = signed(package.disk_usage());
            totals.net = totals
                .net
                .saturating_add(signed(metadata.installed_size).saturating_sub(freed));
        }
    }

    estimate
}

pub(crate) fn signed(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

/// Human readable size such as `12.3MB`; negative values keep their sign.
pub fn format_size(bytes: i64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let sign = if bytes < 0 { "-" } else { "" };
    let abs = bytes.unsigned_abs();

    if abs >= GB {
        format!("{}{:.1}GB", sign, abs as f64 / GB as f64)
    } else if abs >= MB {
        format!("{}{:.1}MB", sign, abs as f64 / MB as f64)
    } else if abs >= KB {
        format!("{}{:.1}KB", sign, abs as f64 / KB as f64)
    } else {
        format!("{}{}B", sign, abs)
    }
}
