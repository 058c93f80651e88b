//! Application layer - the stages of upgrade planning.
//!
//! Each stage is a small function over an inventory snapshot. The planner
//! in [`plan`] chains them and is the only entry point the commands use.

mod closure;
mod confirm;
mod diagnostic;
mod outdated;
mod pins;
mod plan;
mod sizing;
mod targets;

pub use closure::{SizingClosure, Visit, add_outdated_dependents, dependency_closure, visit_dependency};
pub use confirm::{CONFIRM_PROMPT, Confirmation, confirm_plan, parse_answer};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use outdated::{KindFilter, OutdatedQuery, OutdatedSet, resolve_outdated};
pub use pins::{PinSplit, PinnedPackage, filter_pinned};
pub use plan::{PlanOptions, UpgradePlan, UpgradePlanner};
pub use sizing::{SizeEstimate, SizeTotals, estimate_sizes, format_size};
pub use targets::{Target, select_targets};
