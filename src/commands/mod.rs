//! Command entry points invoked from `main`.

pub mod config;
pub mod handoff;
mod outdated;
pub mod services;
mod upgrade;

pub use config::{Config, ConfigOverrides, UpgradeOptions, UsageError, Verbosity};
pub use outdated::{OutdatedOptions, outdated, render_outdated, run_outdated};
pub use upgrade::{UpgradeOutcome, UpgradeReport, run_upgrade, upgrade};
