//! Package managers lay installs out differently; the checker must find the
//! copy each addon actually loads under every layout.

use std::fs;
use std::path::Path;

use addon_checker::{AddonNode, PackageLocator, VersionChecker};
use addon_resolve::{NodeModulesResolver, PnpResolver, ResolverOptions};
use addon_test_utils::FixtureProject;
use addon_test_utils::manifest::write_manifest;
use pretty_assertions::assert_eq;

// =============================================================================
// node_modules
// =============================================================================

/// A yarn workspace: `packages/the-addon` depends on bar@3 while the app
/// and everything hoisted use bar@2.
fn yarn_workspace() -> FixtureProject {
    let mut project = FixtureProject::new("app", "1.0.0");
    project.add_addon(&[], "bar", "2.0.0");

    let addon_dir = project.path("packages/the-addon");
    write_manifest(&addon_dir, "the-addon", Some("0.1.0"));
    write_manifest(&addon_dir.join("node_modules/bar"), "bar", Some("3.0.0"));
    project.add_virtual_addon(
        &[],
        AddonNode::new("the-addon", &addon_dir)
            .with_version("0.1.0")
            .with_addon(AddonNode::new("bar", addon_dir.join("node_modules/bar")).with_version("3.0.0")),
    );
    project
}

#[test]
fn test_workspace_package_sees_its_own_copy() {
    let project = yarn_workspace();
    let addon = &project.tree().addons[1];

    let checker = VersionChecker::for_addon(addon, Some(project.root())).unwrap();

    assert_eq!(checker.for_package("bar").version(), Some("3.0.0"));
}

#[test]
fn test_workspace_duplicates_are_reported() {
    let project = yarn_workspace();
    let checker = VersionChecker::for_project(project.tree()).unwrap();

    assert_eq!(checker.for_package("bar").version(), Some("2.0.0"));
    assert!(!checker.has_single_implementation("bar"));

    let report = checker.implementation_report("bar");
    assert_eq!(report.matches, 2);
    assert_eq!(
        report.roots,
        vec![
            Some(project.path("node_modules/bar")),
            Some(project.path("packages/the-addon/node_modules/bar")),
        ]
    );
}

#[test]
fn test_deep_nesting_shadows_each_level() {
    let mut project = FixtureProject::new("app", "1.0.0");
    project.add_addon(&[], "bar", "1.0.0");
    project.add_addon(&[], "a", "1.0.0");
    project.add_addon(&["a"], "bar", "2.0.0");
    project.add_addon(&["a"], "b", "1.0.0");
    project.add_addon(&["a", "b"], "bar", "3.0.0");
    project.add_addon(&["a", "b"], "c", "1.0.0");

    let tree = project.tree();
    let a = &tree.addons[1];
    let b = &a.addons[1];
    let c = &b.addons[1];
    let version_for = |node: &AddonNode| {
        VersionChecker::for_addon(node, Some(project.root()))
            .unwrap()
            .for_package("bar")
            .version()
            .map(str::to_string)
    };

    assert_eq!(version_for(a).as_deref(), Some("2.0.0"));
    assert_eq!(version_for(b).as_deref(), Some("3.0.0"));
    // c has no copy of its own; the nearest ancestor install wins
    assert_eq!(version_for(c).as_deref(), Some("3.0.0"));

    let report = VersionChecker::for_project(tree).unwrap().implementation_report("bar");
    assert_eq!(report.roots.len(), 3);
}

#[cfg(unix)]
#[test]
fn test_linked_package_reports_real_location() {
    let project = FixtureProject::new("app", "1.0.0");
    let real = project.path("packages/shared");
    write_manifest(&real, "shared", Some("4.2.0"));
    fs::create_dir_all(project.path("node_modules")).unwrap();
    std::os::unix::fs::symlink(&real, project.path("node_modules/shared")).unwrap();

    let checker = VersionChecker::for_project(project.tree()).unwrap();
    let shared = checker.for_package("shared");

    assert_eq!(shared.version(), Some("4.2.0"));
    assert_eq!(shared.manifest_path().unwrap(), real.join("package.json"));
}

#[test]
fn test_explicit_node_modules_resolver_ignores_pnp_data() {
    let mut project = FixtureProject::new("app", "1.0.0");
    project.add_addon(&[], "bar", "2.0.0");
    fs::write(project.path(".pnp.data.json"), "{ broken").unwrap();

    let checker = VersionChecker::for_project(project.tree())
        .unwrap()
        .with_locator(PackageLocator::new(NodeModulesResolver::new()));

    assert_eq!(checker.for_package("bar").version(), Some("2.0.0"));
}

// =============================================================================
// Plug'n'Play
// =============================================================================

const PNP_DATA: &str = r#"{
  "enableTopLevelFallback": true,
  "packageRegistryData": [
    [null, [[null, {
      "packageLocation": "./",
      "packageDependencies": [["bar", "npm:2.0.0"], ["the-addon", "workspace:packages/the-addon"]]
    }]]],
    ["the-addon", [["workspace:packages/the-addon", {
      "packageLocation": "./packages/the-addon/",
      "packageDependencies": [["bar", "npm:3.0.0"]]
    }]]],
    ["bar", [
      ["npm:2.0.0", {"packageLocation": "./.yarn/unplugged/bar-npm-2.0.0/node_modules/bar/", "packageDependencies": []}],
      ["npm:3.0.0", {"packageLocation": "./.yarn/unplugged/bar-npm-3.0.0/node_modules/bar/", "packageDependencies": []}]
    ]]
  ]
}"#;

fn pnp_project() -> FixtureProject {
    let project = FixtureProject::new("app", "1.0.0");
    fs::write(project.path(".pnp.data.json"), PNP_DATA).unwrap();
    write_manifest(&project.path("packages/the-addon"), "the-addon", Some("0.1.0"));
    for version in ["2.0.0", "3.0.0"] {
        let dir = project.path(&format!(".yarn/unplugged/bar-npm-{version}/node_modules/bar"));
        write_manifest(&dir, "bar", Some(version));
    }
    project
}

fn pnp_addon(root: &Path) -> AddonNode {
    AddonNode::new("the-addon", root.join("packages/the-addon"))
}

#[test]
fn test_pnp_layout_is_detected() {
    let project = pnp_project();
    let addon = pnp_addon(project.root());

    let app = VersionChecker::for_project(project.tree()).unwrap();
    let the_addon = VersionChecker::for_addon(&addon, Some(project.root())).unwrap();

    assert_eq!(app.for_package("bar").version(), Some("2.0.0"));
    assert_eq!(the_addon.for_package("bar").version(), Some("3.0.0"));
    // not declared by the addon, found through the top-level fallback
    assert_eq!(the_addon.for_package("the-addon").version(), Some("0.1.0"));
    assert!(!app.for_package("left-pad").exists());
}

#[test]
fn test_explicit_pnp_resolver() {
    let project = pnp_project();
    let resolver =
        PnpResolver::load(&project.path(".pnp.data.json"), ResolverOptions::default()).unwrap();

    let checker = VersionChecker::for_project(project.tree())
        .unwrap()
        .with_locator(PackageLocator::new(resolver));

    assert!(checker.for_package("the-addon").eq("0.1.0"));
    assert!(checker.for_package("bar").satisfies("^2.0.0"));
}
