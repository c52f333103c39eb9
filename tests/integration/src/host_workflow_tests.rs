//! End-to-end flows the way a host build tool drives the checker: hand over
//! its tree as JSON, load the project's checker config, run the checks, and
//! print only the message of a policy failure.

use std::fs;

use addon_checker::{CheckerConfig, Error, HostTarget, Requirements, TargetShape, VersionChecker};
use addon_test_utils::FixtureProject;
use pretty_assertions::assert_eq;
use serde_json::json;

fn ember_app() -> FixtureProject {
    let mut project = FixtureProject::new("my-app", "0.0.0");
    project.add_addon(&[], "ember-source", "4.12.0");
    project.add_addon(&[], "ember-auto-import", "2.6.3");
    project.add_addon(&[], "ember-data", "4.12.0");
    project.add_addon(&["ember-data"], "ember-auto-import", "1.12.2");
    project
}

#[test]
fn test_project_json_flow() {
    let project = ember_app();
    let mut value = serde_json::to_value(project.tree()).unwrap();
    value["addonsInitialized"] = json!(true);

    let host = HostTarget::from_json(&value).unwrap();
    assert_eq!(host.shape(), TargetShape::Project);
    let checker = VersionChecker::new(host.target().unwrap());

    assert!(checker.for_package("ember-source").gte("3.28.0"));
    assert!(checker.has_single_implementation("ember-source"));

    let err = checker
        .assert_single_implementation("ember-auto-import", None)
        .unwrap_err();
    assert!(err.suppress_stacktrace());
    let message = err.to_string();
    assert!(message.starts_with(
        "This project requires a single implementation version of the npm package 'ember-auto-import', but there're multiple."
    ));
    assert_eq!(message.lines().count(), 3);
}

#[test]
fn test_addon_json_flow() {
    let project = ember_app();
    let ember_data = project.tree().addons[2].clone();
    let mut value = serde_json::to_value(&ember_data).unwrap();
    value["project"] = json!({ "root": project.root() });

    let host = HostTarget::from_json(&value).unwrap();
    assert_eq!(host.shape(), TargetShape::Addon);
    let checker = VersionChecker::new(host.target().unwrap());

    let auto_import = checker.for_package("ember-auto-import");
    assert_eq!(auto_import.version(), Some("1.12.2"));
    let err = auto_import.assert_above("2.0.0", None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The addon `ember-data` requires the npm package `ember-auto-import` to be above 2.0.0, but you have 1.12.2."
    );

    // resolved from the addon, hoisted copy
    assert!(checker.for_package("ember-source").satisfies(">= 4.0.0 < 5.0.0"));
}

#[test]
fn test_uninitialized_project_is_rejected() {
    let project = ember_app();
    let mut value = serde_json::to_value(project.tree()).unwrap();
    value["addonsInitialized"] = json!(false);

    let err = HostTarget::from_json(&value).unwrap_err();

    assert!(matches!(err, Error::InvalidTarget { .. }));
    assert!(!err.suppress_stacktrace());
}

#[test]
fn test_yaml_config_flow() {
    let project = ember_app();
    let config_path = project.path("config/version-checker.yml");
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(
        &config_path,
        "requirements:\n  ember-source: \">= 3.28.0\"\n  ember-auto-import: \"^2.0.0\"\n  ember-cli-babel: \"*\"\n",
    )
    .unwrap();

    let config = CheckerConfig::load(&config_path).unwrap();
    let checker = VersionChecker::for_project(project.tree())
        .unwrap()
        .with_config(&config);
    let result = checker.check_configured();

    assert!(!result.is_satisfied);
    assert!(result.package("ember-source").unwrap().is_satisfied);
    assert_eq!(
        result.package("ember-auto-import").unwrap().versions,
        vec!["2.6.3", "1.12.2"]
    );

    let err = result
        .assert(Some("my-app requires a modern Ember toolchain"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Checker Assertion Failed\n\
         my-app requires a modern Ember toolchain\n  \
         - 'ember-auto-import' expected version: [^2.0.0] but got versions: [2.6.3, 1.12.2]\n  \
         - 'ember-cli-babel' expected version: [*] but it was not found"
    );
}

#[test]
fn test_report_serializes_for_host_output() {
    let project = ember_app();
    let checker = VersionChecker::for_project(project.tree()).unwrap();

    let result = checker.check(&Requirements::new().require("ember-data", "~4.12.0"));
    let report = serde_json::to_value(&result).unwrap();
    assert_eq!(report["is_satisfied"], json!(true));
    assert_eq!(report["node_modules"]["ember-data"]["versions"], json!(["4.12.0"]));

    let implementations =
        serde_json::to_value(checker.implementation_report("ember-auto-import")).unwrap();
    assert_eq!(implementations["matches"], json!(2));
    assert_eq!(implementations["roots"].as_array().unwrap().len(), 2);
}
