//! Dependency closure used for sizing an upgrade.
//!
//! The closure starts from the targets, follows dependencies that are
//! themselves worth sizing, and finally picks up outdated dependents of
//! anything already in it.

use log::debug;
use std::collections::HashSet;

use crate::package::{Package, PackageInventory, PackageName};

use super::outdated::KindFilter;
use super::targets::Target;

/// Outcome of looking at one dependency edge during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Add the dependency to the closure and descend into it
    Include,
    /// Leave the dependency and everything below it out
    Prune,
}

/// Decide whether `dependency` of `parent` joins the sizing closure.
///
/// Only outdated, bottled dependencies that have dependencies of their own
/// are kept. A dependency missing from the inventory is not installed, so it
/// is pruned as not outdated.
pub fn visit_dependency(parent: &Package, dependency: Option<&Package>, check_head: bool) -> Visit {
    let Some(dependency) = dependency else {
        return Visit::Prune;
    };

    if dependency.name == parent.name
        || dependency.dependencies().is_empty()
        || !dependency.outdated(check_head)
        || !dependency.is_bottled()
    {
        Visit::Prune
    } else {
        Visit::Include
    }
}

/// Insertion-ordered set of package identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizingClosure {
    members: Vec<PackageName>,
    index: HashSet<PackageName>,
}

impl SizingClosure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member; returns false when it was already present.
    pub fn insert(&mut self, name: PackageName) -> bool {
        if self.index.contains(&name) {
            return false;
        }
        self.index.insert(name.clone());
        self.members.push(name);
        true
    }

    pub fn contains(&self, name: &PackageName) -> bool {
        self.index.contains(name)
    }

    pub fn members(&self) -> &[PackageName] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn into_members(self) -> Vec<PackageName> {
        self.members
    }
}

/// Targets plus their pruned dependency expansion.
#[tracing::instrument(skip(inventory, targets))]
pub fn dependency_closure<I: PackageInventory>(
    inventory: &I,
    targets: &[Target],
    check_head: bool,
) -> SizingClosure {
    let mut closure = SizingClosure::new();
    for target in targets {
        closure.insert(target.install_name.clone());
    }

    let mut pruned: HashSet<&PackageName> = HashSet::new();

    for target in targets {
        let Some(root) = inventory.get(&target.install_name) else {
            continue;
        };
        if root.dependencies().is_empty() {
            continue;
        }

        let mut stack: Vec<(&Package, &PackageName)> = root
            .dependencies()
            .iter()
            .rev()
            .map(|dep| (root, dep))
            .collect();

        while let Some((parent, dep_name)) = stack.pop() {
            if closure.contains(dep_name) || pruned.contains(dep_name) {
                continue;
            }

            let dependency = inventory.get(dep_name);
            match (visit_dependency(parent, dependency, check_head), dependency) {
                (Visit::Include, Some(dependency)) => {
                    closure.insert(dependency.name.clone());
                    stack.extend(
                        dependency
                            .dependencies()
                            .iter()
                            .rev()
                            .map(|dep| (dependency, dep)),
                    );
                }
                _ => {
                    pruned.insert(dep_name);
                }
            }
        }
    }

    debug!(
        "Dependency closure of {} target(s) has {} member(s)",
        targets.len(),
        closure.len()
    );
    closure
}

/// Add installed, outdated packages of the requested kinds that directly
/// depend on a closure member.
///
/// Dependents are matched against the closure as it was before this pass.
#[tracing::instrument(skip(inventory, closure))]
pub fn add_outdated_dependents<I: PackageInventory>(
    inventory: &I,
    closure: &mut SizingClosure,
    check_head: bool,
    kinds: KindFilter,
) {
    let base: HashSet<PackageName> = closure.members().iter().cloned().collect();

    let dependents: Vec<PackageName> = inventory
        .installed_packages()
        .into_iter()
        .filter(|package| kinds.allows(package.kind))
        .filter(|package| !base.contains(&package.name))
        .filter(|package| package.dependencies().iter().any(|dep| base.contains(dep)))
        .filter(|package| package.outdated(check_head))
        .map(|package| package.name.clone())
        .collect();

    for name in dependents {
        debug!("Adding outdated dependent {} to the closure", name);
        closure.insert(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageKind;
    use crate::test_utils::{bottled, current, installed, name, snapshot};

    fn target(install_name: &str) -> Target {
        Target {
            name: name(install_name),
            install_name: name(install_name),
            installed_version: "1".into(),
            version: "2".into(),
            head: false,
        }
    }

    fn with_deps(mut package: Package, deps: &[&str]) -> Package {
        package.dependencies = deps.iter().map(|d| name(d)).collect();
        package
    }

    fn members(closure: &SizingClosure) -> Vec<String> {
        closure.members().iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_visit_prunes_leaf_current_and_unbottled() {
        let parent = with_deps(bottled("x", "1", "2"), &["dep"]);

        let leaf = bottled("leaf", "1", "2");
        assert_eq!(visit_dependency(&parent, Some(&leaf), false), Visit::Prune);

        let current_dep = with_deps(current("cur", "1"), &["z"]);
        assert_eq!(
            visit_dependency(&parent, Some(&current_dep), false),
            Visit::Prune
        );

        let unbottled = with_deps(installed("src", "1", "2"), &["z"]);
        assert_eq!(
            visit_dependency(&parent, Some(&unbottled), false),
            Visit::Prune
        );

        assert_eq!(visit_dependency(&parent, None, false), Visit::Prune);

        let good = with_deps(bottled("good", "1", "2"), &["z"]);
        assert_eq!(visit_dependency(&parent, Some(&good), false), Visit::Include);
    }

    #[test]
    fn test_visit_prunes_self_dependency() {
        let parent = with_deps(bottled("x", "1", "2"), &["x"]);
        assert_eq!(visit_dependency(&parent, Some(&parent), false), Visit::Prune);
    }

    #[test]
    fn test_leaf_and_current_dependencies_are_pruned() {
        // x -> y (outdated, bottled, leaf), x -> z (current)
        let inventory = snapshot(vec![
            with_deps(bottled("x", "1", "2"), &["y", "z"]),
            bottled("y", "1", "2"),
            with_deps(current("z", "1"), &["w"]),
            bottled("w", "1", "2"),
        ]);

        let closure = dependency_closure(&inventory, &[target("x")], false);
        assert_eq!(members(&closure), vec!["x"]);
    }

    #[test]
    fn test_included_dependencies_are_expanded() {
        // x -> m -> n -> leaf
        let inventory = snapshot(vec![
            with_deps(bottled("x", "1", "2"), &["m"]),
            with_deps(bottled("m", "1", "2"), &["n"]),
            with_deps(bottled("n", "1", "2"), &["leaf"]),
            bottled("leaf", "1", "2"),
        ]);

        let closure = dependency_closure(&inventory, &[target("x")], false);
        assert_eq!(members(&closure), vec!["x", "m", "n"]);
    }

    #[test]
    fn test_pruned_dependency_is_not_descended() {
        // x -> s (unbottled) -> deep (would qualify)
        let inventory = snapshot(vec![
            with_deps(bottled("x", "1", "2"), &["s"]),
            with_deps(installed("s", "1", "2"), &["deep"]),
            with_deps(bottled("deep", "1", "2"), &["leaf"]),
        ]);

        let closure = dependency_closure(&inventory, &[target("x")], false);
        assert_eq!(members(&closure), vec!["x"]);
    }

    #[test]
    fn test_diamond_and_cycle_dedupe_by_identity() {
        // a -> b, a -> c, b -> d, c -> d, d -> b (cycle)
        let inventory = snapshot(vec![
            with_deps(bottled("a", "1", "2"), &["b", "c"]),
            with_deps(bottled("b", "1", "2"), &["d"]),
            with_deps(bottled("c", "1", "2"), &["d"]),
            with_deps(bottled("d", "1", "2"), &["b"]),
        ]);

        let closure = dependency_closure(&inventory, &[target("a"), target("d")], false);

        let names = members(&closure);
        assert_eq!(names.len(), 4);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names[0..2], ["a".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_target_without_dependencies_only_contributes_itself() {
        let inventory = snapshot(vec![bottled("solo", "1", "2")]);
        let closure = dependency_closure(&inventory, &[target("solo")], false);
        assert_eq!(members(&closure), vec!["solo"]);
    }

    #[test]
    fn test_outdated_dependents_are_added_once() {
        let inventory = snapshot(vec![
            bottled("openssl", "1", "2"),
            with_deps(installed("curl", "8.6", "8.7"), &["openssl"]),
            with_deps(installed("wget", "1.21", "1.24"), &["openssl", "curl"]),
            with_deps(current("git", "2.45"), &["openssl"]),
            with_deps(installed("httpie", "1", "2"), &["curl"]),
        ]);

        let mut closure = dependency_closure(&inventory, &[target("openssl")], false);
        add_outdated_dependents(&inventory, &mut closure, false, KindFilter::Any);

        // git is current; httpie only depends on a dependent added in this pass
        assert_eq!(members(&closure), vec!["openssl", "curl", "wget"]);
    }

    #[test]
    fn test_outdated_dependents_respect_kind_filter() {
        let mut cask = with_deps(installed("wireshark-app", "4.0", "4.2"), &["openssl"]);
        cask.kind = PackageKind::Cask;
        let inventory = snapshot(vec![
            bottled("openssl", "1", "2"),
            with_deps(installed("curl", "8.6", "8.7"), &["openssl"]),
            cask,
        ]);

        let mut formulae = dependency_closure(&inventory, &[target("openssl")], false);
        add_outdated_dependents(&inventory, &mut formulae, false, KindFilter::Formula);
        assert_eq!(members(&formulae), vec!["openssl", "curl"]);

        let mut any = dependency_closure(&inventory, &[target("openssl")], false);
        add_outdated_dependents(&inventory, &mut any, false, KindFilter::Any);
        assert_eq!(members(&any), vec!["openssl", "curl", "wireshark-app"]);
    }

    #[test]
    fn test_sizing_closure_insert_is_idempotent() {
        let mut closure = SizingClosure::new();
        assert!(closure.insert(name("a")));
        assert!(!closure.insert(name("a")));
        assert!(closure.insert(name("b")));
        assert_eq!(closure.len(), 2);
        assert!(closure.contains(&name("b")));
        assert_eq!(closure.into_members(), vec![name("a"), name("b")]);
    }
}
