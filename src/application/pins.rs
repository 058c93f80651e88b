//! Splits upgrade candidates by pin status.

use serde::Serialize;

use crate::package::{Package, PackageName};

use super::diagnostic::{Diagnostic, DiagnosticKind};

/// A package left alone because it is pinned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedPackage {
    pub name: PackageName,
    pub version: String,
}

#[derive(Debug, Default)]
pub struct PinSplit<'a> {
    pub unpinned: Vec<&'a Package>,
    pub pinned: Vec<PinnedPackage>,
    pub diagnostic: Option<Diagnostic>,
}

/// Partition candidates into pinned and unpinned, preserving order.
///
/// Skipping pinned packages is a failure when they were requested by name
/// and an advisory otherwise.
pub fn filter_pinned(candidates: Vec<&Package>, explicit: bool) -> PinSplit<'_> {
    let (pinned, unpinned): (Vec<&Package>, Vec<&Package>) =
        candidates.into_iter().partition(|package| package.pinned);

    let pinned: Vec<PinnedPackage> = pinned
        .into_iter()
        .map(|package| PinnedPackage {
            name: package.name.clone(),
            version: package.installed_version().unwrap_or_default(),
        })
        .collect();

    let diagnostic = if pinned.is_empty() {
        None
    } else {
        let listing = pinned
            .iter()
            .map(|p| format!("{} {}", p.name, p.version))
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!(
            "Not upgrading {} pinned package(s):\n  {}",
            pinned.len(),
            listing
        );
        Some(if explicit {
            Diagnostic::failure(DiagnosticKind::Pinned, message)
        } else {
            Diagnostic::advisory(DiagnosticKind::Pinned, message)
        })
    };

    PinSplit {
        unpinned,
        pinned,
        diagnostic,
    }
}
