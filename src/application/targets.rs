//! Resolves upgrade candidates to the concrete form that gets installed.

use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::package::{Package, PackageInventory, PackageName};

/// One package the installer is asked to install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// The installed package being upgraded
    pub name: PackageName,
    /// The package that will be installed (differs after a rename)
    pub install_name: PackageName,
    pub installed_version: String,
    pub version: String,
    /// Rebuild from the upstream head
    pub head: bool,
}

impl Target {
    pub fn is_rename(&self) -> bool {
        self.name != self.install_name
    }
}

/// Pick the installable form for each candidate, keeping candidate order.
///
/// Head installs stay on head. Otherwise the package's latest form is
/// chosen unless that form is already installed at its latest version.
pub fn select_targets<I: PackageInventory>(inventory: &I, candidates: &[&Package]) -> Vec<Target> {
    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(candidates.len());

    for &package in candidates {
        let target = select_target(inventory, package);
        if !seen.insert(target.install_name.clone()) {
            debug!(
                "{} resolves to {}, which is already targeted",
                package.name, target.install_name
            );
            continue;
        }
        targets.push(target);
    }

    targets
}

fn select_target<I: PackageInventory>(inventory: &I, package: &Package) -> Target {
    let installed_version = package.installed_version().unwrap_or_default();

    if package.is_head() {
        let version = match &package.head_revision {
            Some(rev) => format!("HEAD-{}", rev),
            None => "HEAD".to_string(),
        };
        return Target {
            name: package.name.clone(),
            install_name: package.name.clone(),
            installed_version,
            version,
            head: true,
        };
    }

    let latest = match inventory.get(package.latest_form()) {
        Some(latest) => latest,
        None => {
            debug!(
                "Latest form {} of {} is unknown, keeping {}",
                package.latest_form(),
                package.name,
                package.name
            );
            package
        }
    };

    let chosen = if latest.is_latest_version_installed() {
        package
    } else if latest.pinned && latest.name != package.name {
        debug!(
            "Latest form {} of {} is pinned, keeping {}",
            latest.name, package.name, package.name
        );
        package
    } else {
        latest
    };

    Target {
        name: package.name.clone(),
        install_name: chosen.name.clone(),
        installed_version,
        version: chosen.version.clone(),
        head: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{current, head_keg, installed, name, pinned, snapshot};

    #[test]
    fn test_outdated_package_targets_its_latest_version() {
        let inventory = snapshot(vec![installed("wget", "1.21", "1.24")]);
        let wget = inventory.get(&name("wget")).unwrap();

        let targets = select_targets(&inventory, &[wget]);

        assert_eq!(
            targets,
            vec![Target {
                name: name("wget"),
                install_name: name("wget"),
                installed_version: "1.21".into(),
                version: "1.24".into(),
                head: false,
            }]
        );
    }

    #[test]
    fn test_renamed_package_targets_latest_form() {
        let mut old = installed("python@3.11", "3.11.8", "3.11.9");
        old.latest_name = Some(name("python@3.12"));
        let new = Package::new(name("python@3.12"), "3.12.3");
        let inventory = snapshot(vec![old, new]);
        let old = inventory.get(&name("python@3.11")).unwrap();

        let targets = select_targets(&inventory, &[old]);

        assert_eq!(targets[0].name, name("python@3.11"));
        assert_eq!(targets[0].install_name, name("python@3.12"));
        assert_eq!(targets[0].version, "3.12.3");
        assert!(targets[0].is_rename());
    }

    #[test]
    fn test_latest_form_already_installed_keeps_installed_form() {
        let mut old = installed("python@3.11", "3.11.8", "3.11.9");
        old.latest_name = Some(name("python@3.12"));
        let inventory = snapshot(vec![old, current("python@3.12", "3.12.3")]);
        let old = inventory.get(&name("python@3.11")).unwrap();

        let targets = select_targets(&inventory, &[old]);

        assert_eq!(targets[0].install_name, name("python@3.11"));
        assert_eq!(targets[0].version, "3.11.9");
        assert!(!targets[0].is_rename());
    }

    #[test]
    fn test_pinned_latest_form_keeps_installed_form() {
        let mut old = installed("python@3.11", "3.11.8", "3.11.9");
        old.latest_name = Some(name("python@3.12"));
        let inventory = snapshot(vec![old, pinned("python@3.12", "3.12.1", "3.12.3")]);
        let old = inventory.get(&name("python@3.11")).unwrap();

        let targets = select_targets(&inventory, &[old]);

        assert_eq!(targets[0].install_name, name("python@3.11"));
        assert_eq!(targets[0].version, "3.11.9");
        assert!(!targets[0].is_rename());
    }

    #[test]
    fn test_unknown_latest_form_keeps_installed_form() {
        let mut old = installed("node@18", "18.1", "18.2");
        old.latest_name = Some(name("node"));
        let inventory = snapshot(vec![old]);
        let old = inventory.get(&name("node@18")).unwrap();

        let targets = select_targets(&inventory, &[old]);
        assert_eq!(targets[0].install_name, name("node@18"));
        assert_eq!(targets[0].version, "18.2");
    }

    #[test]
    fn test_head_install_stays_on_head() {
        let mut neovim = Package::new(name("neovim"), "0.10.0");
        neovim.head_revision = Some("abc123".into());
        neovim.kegs.push(head_keg("0.10.0", "fff000"));
        let inventory = snapshot(vec![neovim]);
        let neovim = inventory.get(&name("neovim")).unwrap();

        let targets = select_targets(&inventory, &[neovim]);

        assert!(targets[0].head);
        assert_eq!(targets[0].installed_version, "HEAD-fff000");
        assert_eq!(targets[0].version, "HEAD-abc123");
    }

    #[test]
    fn test_one_target_per_candidate_in_order() {
        let inventory = snapshot(vec![
            installed("a", "1", "2"),
            installed("b", "1", "2"),
            installed("c", "1", "2"),
        ]);
        let c = inventory.get(&name("c")).unwrap();
        let a = inventory.get(&name("a")).unwrap();
        let b = inventory.get(&name("b")).unwrap();

        let targets = select_targets(&inventory, &[c, a, b]);
        let order: Vec<_> = targets.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_candidates_converging_on_one_form_are_deduplicated() {
        let mut old_a = installed("tool@1", "1.0", "1.1");
        old_a.latest_name = Some(name("tool"));
        let mut old_b = installed("tool@2", "2.0", "2.1");
        old_b.latest_name = Some(name("tool"));
        let inventory = snapshot(vec![old_a, old_b, Package::new(name("tool"), "3.0")]);
        let a = inventory.get(&name("tool@1")).unwrap();
        let b = inventory.get(&name("tool@2")).unwrap();

        let targets = select_targets(&inventory, &[a, b]);

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, name("tool@1"));
        assert_eq!(targets[0].install_name, name("tool"));
    }
}
