use serde::{Deserialize, Serialize};

use super::PackageName;

/// Whether a package is a formula (built or bottled) or a cask (prebuilt app).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    #[default]
    Formula,
    Cask,
}

/// One installed instance of a package.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Keg {
    /// Stable version of the package this keg was built from
    pub version: String,
    /// Upstream revision for head-tracked installs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    /// Bytes currently used on disk
    #[serde(default)]
    pub disk_usage: u64,
    /// Install timestamp, only used for ordering
    #[serde(default)]
    pub installed_at: u64,
}

impl Keg {
    pub fn is_head(&self) -> bool {
        self.head.is_some()
    }

    /// Version string as shown to users (`HEAD-<rev>` for head installs).
    pub fn display_version(&self) -> String {
        match &self.head {
            Some(rev) => format!("HEAD-{}", rev),
            None => self.version.clone(),
        }
    }
}

/// Availability of a prebuilt artifact for the package's latest version.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Bottle {
    /// Platform tag the bottle was built for
    #[serde(default)]
    pub tag: String,
    /// Explicit metadata URL, overriding the metadata API default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A package as recorded in the inventory snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Package {
    pub name: PackageName,
    #[serde(default)]
    pub kind: PackageKind,
    /// Latest known stable version
    pub version: String,
    /// Latest known upstream head revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_revision: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    /// Identity of the package's latest form when it was renamed or superseded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_name: Option<PackageName>,
    #[serde(default)]
    pub dependencies: Vec<PackageName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottle: Option<Bottle>,
    #[serde(default)]
    pub kegs: Vec<Keg>,
}

impl Package {
    pub fn new(name: PackageName, version: &str) -> Self {
        Package {
            name,
            kind: PackageKind::Formula,
            version: version.to_string(),
            head_revision: None,
            pinned: false,
            latest_name: None,
            dependencies: vec![],
            bottle: None,
            kegs: vec![],
        }
    }

    pub fn dependencies(&self) -> &[PackageName] {
        &self.dependencies
    }

    pub fn bottle(&self) -> Option<&Bottle> {
        self.bottle.as_ref()
    }

    pub fn installed_kegs(&self) -> &[Keg] {
        &self.kegs
    }

    pub fn is_installed(&self) -> bool {
        !self.kegs.is_empty()
    }

    pub fn is_bottled(&self) -> bool {
        self.bottle.is_some()
    }

    /// The most recently installed keg.
    pub fn newest_keg(&self) -> Option<&Keg> {
        self.kegs.iter().max_by_key(|keg| keg.installed_at)
    }

    /// Whether the active install tracks the upstream head.
    pub fn is_head(&self) -> bool {
        self.newest_keg().is_some_and(Keg::is_head)
    }

    /// Version of the active install, if any.
    pub fn installed_version(&self) -> Option<String> {
        self.newest_keg().map(Keg::display_version)
    }

    /// Whether a non-head keg at the latest stable version is installed.
    pub fn is_latest_version_installed(&self) -> bool {
        self.kegs
            .iter()
            .any(|keg| !keg.is_head() && keg.version == self.version)
    }

    /// Identity of the form that an upgrade of this package should install.
    pub fn latest_form(&self) -> &PackageName {
        self.latest_name.as_ref().unwrap_or(&self.name)
    }

    /// Total bytes used by all installed kegs.
    pub fn disk_usage(&self) -> u64 {
        self.kegs.iter().map(|keg| keg.disk_usage).sum()
    }

    /// Whether the installed package lags behind the latest known version.
    ///
    /// A head-tracked install only counts as outdated against a newer
    /// upstream revision when `check_head` is set, but a new stable release
    /// always makes it outdated.
    pub fn outdated(&self, check_head: bool) -> bool {
        let Some(newest) = self.newest_keg() else {
            return false;
        };

        match &newest.head {
            Some(installed_rev) => {
                let head_moved = check_head
                    && self
                        .head_revision
                        .as_ref()
                        .is_some_and(|latest_rev| latest_rev != installed_rev);
                head_moved || newest.version != self.version
            }
            None => !self.is_latest_version_installed(),
        }
    }
}
