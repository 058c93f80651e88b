use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::application::KindFilter;
use crate::metadata::DEFAULT_API_URL;
use crate::package::PackageName;
use crate::runtime::Runtime;

pub const INVENTORY_ENV: &str = "KEGUP_INVENTORY";
pub const API_URL_ENV: &str = "KEGUP_API_URL";
pub const NO_DEPENDENTS_CHECK_ENV: &str = "KEGUP_NO_INSTALLED_DEPENDENTS_CHECK";
pub const NO_INSTALL_CLEANUP_ENV: &str = "KEGUP_NO_INSTALL_CLEANUP";
pub const DEVELOPER_ENV: &str = "KEGUP_DEVELOPER";

/// Process-wide toggles, read once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnvToggles {
    pub no_dependents_check: bool,
    pub no_install_cleanup: bool,
    pub developer: bool,
}

impl EnvToggles {
    pub fn from_runtime<R: Runtime + ?Sized>(runtime: &R) -> Self {
        Self {
            no_dependents_check: toggle(runtime, NO_DEPENDENTS_CHECK_ENV),
            no_install_cleanup: toggle(runtime, NO_INSTALL_CLEANUP_ENV),
            developer: toggle(runtime, DEVELOPER_ENV),
        }
    }
}

fn toggle<R: Runtime + ?Sized>(runtime: &R, key: &str) -> bool {
    match runtime.env_var(key) {
        Ok(value) => !matches!(value.trim(), "" | "0" | "false"),
        Err(_) => false,
    }
}

/// Values given on the command line that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub inventory_path: Option<PathBuf>,
    pub api_url: Option<String>,
}

/// Configuration for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Inventory snapshot to plan against
    pub inventory_path: PathBuf,
    /// Base URL of the bottle metadata API
    pub api_url: String,
    pub toggles: EnvToggles,
}

impl Config {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, overrides: ConfigOverrides) -> Result<Self> {
        let inventory_path = match overrides.inventory_path {
            Some(path) => path,
            None => match runtime.env_var(INVENTORY_ENV) {
                Ok(path) if !path.is_empty() => PathBuf::from(path),
                _ => Self::default_inventory_path(runtime)?,
            },
        };

        let api_url = match overrides.api_url {
            Some(url) => url,
            None => match runtime.env_var(API_URL_ENV) {
                Ok(url) if !url.is_empty() => url,
                _ => DEFAULT_API_URL.to_string(),
            },
        };

        let config = Self {
            inventory_path,
            api_url: api_url.trim_end_matches('/').to_string(),
            toggles: EnvToggles::from_runtime(runtime),
        };
        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    fn default_inventory_path<R: Runtime + ?Sized>(runtime: &R) -> Result<PathBuf> {
        let home = runtime.home_dir().context(format!(
            "Could not determine the home directory, set {}",
            INVENTORY_ENV
        ))?;
        Ok(home.join(".kegup").join("inventory.json"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if verbose {
            Verbosity::Verbose
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    pub fn is_quiet(self) -> bool {
        self == Verbosity::Quiet
    }
}

/// Invalid flag combinations, rejected before planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    BuildFromSourceRequiresNames,
    ConflictingKinds,
    ConflictingBuildModes,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::BuildFromSourceRequiresNames => write!(
                f,
                "--build-from-source requires at least one package name"
            ),
            UsageError::ConflictingKinds => {
                write!(f, "--formula and --cask cannot be used together")
            }
            UsageError::ConflictingBuildModes => write!(
                f,
                "--build-from-source and --force-bottle cannot be used together"
            ),
        }
    }
}

impl std::error::Error for UsageError {}

/// Options for the `upgrade` command.
#[derive(Debug, Clone, Default)]
pub struct UpgradeOptions {
    pub names: Vec<PackageName>,
    pub dry_run: bool,
    pub ask: bool,
    pub build_from_source: bool,
    pub force_bottle: bool,
    pub fetch_head: bool,
    pub force: bool,
    pub interactive: bool,
    pub keep_tmp: bool,
    pub debug_symbols: bool,
    pub overwrite: bool,
    pub formula: bool,
    pub cask: bool,
    pub verbosity: Verbosity,
    /// Directory for hand-off documents, stdout when unset
    pub handoff: Option<PathBuf>,
}

impl UpgradeOptions {
    pub fn validate(&self) -> Result<(), UsageError> {
        if self.formula && self.cask {
            return Err(UsageError::ConflictingKinds);
        }
        if self.build_from_source && self.names.is_empty() {
            return Err(UsageError::BuildFromSourceRequiresNames);
        }
        if self.build_from_source && self.force_bottle {
            return Err(UsageError::ConflictingBuildModes);
        }
        Ok(())
    }

    pub fn kinds(&self) -> KindFilter {
        KindFilter::from_flags(self.formula, self.cask)
    }

    /// Settings passed to the installer and dependents checker.
    pub fn install_config(&self, toggles: EnvToggles) -> InstallConfig {
        InstallConfig {
            force_bottle: self.force_bottle,
            build_from_source: self.build_from_source,
            interactive: self.interactive,
            keep_tmp: self.keep_tmp,
            debug_symbols: self.debug_symbols,
            overwrite: self.overwrite,
            force: self.force,
            dry_run: self.dry_run,
            verbosity: self.verbosity,
            no_install_cleanup: toggles.no_install_cleanup,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InstallConfig {
    pub force_bottle: bool,
    pub build_from_source: bool,
    pub interactive: bool,
    pub keep_tmp: bool,
    pub debug_symbols: bool,
    pub overwrite: bool,
    pub force: bool,
    pub dry_run: bool,
    pub verbosity: Verbosity,
    pub no_install_cleanup: bool,
}
