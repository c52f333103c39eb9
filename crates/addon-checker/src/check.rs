//! Bulk requirement checks over a tree.
//!
//! Every installed version of a required package must satisfy its range.
//! A package that is not installed anywhere fails its requirement.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::range::VersionRange;
use crate::tree::AddonTree;

/// A package name and the range its installs must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    pub range: String,
}

/// Ordered set of requirements. Later entries for the same name replace
/// earlier ones in place.
///
/// Serializes as a name to range map in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct Requirements {
    entries: Vec<Requirement>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requirement, builder style.
    pub fn require(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.insert(name, range);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, range: impl Into<String>) {
        let name = name.into();
        let range = range.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.range = range,
            None => self.entries.push(Requirement { name, range }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Requirements {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut requirements = Self::new();
        for (name, range) in iter {
            requirements.insert(name, range);
        }
        requirements
    }
}

impl Serialize for Requirements {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|entry| (&entry.name, &entry.range)))
    }
}

impl From<BTreeMap<String, String>> for Requirements {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

/// Listed in failure messages for installs that declare no version.
const UNKNOWN_VERSION: &str = "<unknown>";

/// Outcome for one required package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCheck {
    pub name: String,
    pub range: String,
    /// Distinct installed versions, in the order first encountered.
    /// Installs without a declared version are not listed.
    pub versions: Vec<String>,
    pub is_satisfied: bool,
    /// Why the requirement failed; empty when satisfied.
    pub message: String,
}

impl PackageCheck {
    pub(crate) fn evaluate<N: AddonTree>(requirement: &Requirement, matches: &[&N]) -> Self {
        let Requirement { name, range } = requirement;

        let mut versions: Vec<String> = Vec::new();
        for version in matches.iter().filter_map(|node| node.version()) {
            if !versions.iter().any(|seen| seen == version) {
                versions.push(version.to_string());
            }
        }

        let (is_satisfied, message) = match VersionRange::parse(range) {
            Ok(parsed) => {
                let satisfied = !matches.is_empty()
                    && matches
                        .iter()
                        .all(|node| node.version().is_some_and(|v| parsed.satisfies(v)));
                let message = if satisfied {
                    String::new()
                } else if matches.is_empty() {
                    format!("'{name}' expected version: [{range}] but it was not found")
                } else {
                    let mut found: Vec<&str> = versions.iter().map(String::as_str).collect();
                    if matches.iter().any(|node| node.version().is_none()) {
                        found.push(UNKNOWN_VERSION);
                    }
                    let plural = if found.len() > 1 { "s" } else { "" };
                    format!(
                        "'{name}' expected version: [{range}] but got version{plural}: [{}]",
                        found.join(", ")
                    )
                };
                (satisfied, message)
            }
            Err(e) => (false, format!("'{name}' cannot be checked: {e}")),
        };

        Self {
            name: name.clone(),
            range: range.clone(),
            versions,
            is_satisfied,
            message,
        }
    }
}

/// Outcome of checking a set of requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Per-package outcomes, in requirement order. Serialized keyed by
    /// package name.
    #[serde(serialize_with = "by_name")]
    pub node_modules: Vec<PackageCheck>,
    pub is_satisfied: bool,
    /// One indented bullet line per failing package.
    pub message: String,
}

impl CheckResult {
    pub(crate) fn evaluate<N: AddonTree>(
        requirements: &Requirements,
        matches: &HashMap<String, Vec<&N>>,
    ) -> Self {
        let node_modules: Vec<PackageCheck> = requirements
            .iter()
            .map(|requirement| {
                let found = matches
                    .get(&requirement.name)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                PackageCheck::evaluate(requirement, found)
            })
            .collect();

        let is_satisfied = node_modules.iter().all(|package| package.is_satisfied);
        let message = node_modules
            .iter()
            .filter(|package| !package.is_satisfied)
            .map(|package| format!("  - {}", package.message))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            node_modules,
            is_satisfied,
            message,
        }
    }

    /// Outcome for one package.
    pub fn package(&self, name: &str) -> Option<&PackageCheck> {
        self.node_modules.iter().find(|package| package.name == name)
    }

    /// Fail with every unmet requirement unless all are satisfied.
    pub fn assert(&self, description: Option<&str>) -> Result<()> {
        if self.is_satisfied {
            return Ok(());
        }

        let mut lines = vec!["Checker Assertion Failed"];
        if let Some(description) = description {
            lines.push(description);
        }
        lines.push(&self.message);
        Err(Error::assertion(lines.join("\n")))
    }
}

fn by_name<S: Serializer>(
    packages: &[PackageCheck],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(packages.iter().map(|package| (&package.name, package)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::AddonNode;
    use crate::walker::TreeWalker;
    use pretty_assertions::assert_eq;

    fn tree() -> AddonNode {
        AddonNode::new("rsvp", "/app")
            .with_version("3.1.4")
            .with_addon(AddonNode::new("top", "node_modules/top").with_version("1.0.0"))
            .with_addon(AddonNode::new("bar", "node_modules/bar").with_version("3.0.0"))
            .with_addon(
                AddonNode::new("fake-addon", "node_modules/fake-addon")
                    .with_version("3.0.0")
                    .with_addon(
                        AddonNode::new("foo", "node_modules/fake-addon/node_modules/foo")
                            .with_version("1.0.0"),
                    )
                    .with_addon(
                        AddonNode::new("bar", "node_modules/fake-addon/node_modules/bar")
                            .with_version("2.0.0"),
                    ),
            )
    }

    fn check(tree: &AddonNode, requirements: &Requirements) -> CheckResult {
        let matches = TreeWalker::new(tree).filter_by_names(&requirements.names());
        CheckResult::evaluate(requirements, &matches)
    }

    #[test]
    fn test_satisfied_requirements() {
        let tree = tree();
        let result = check(
            &tree,
            &Requirements::new().require("top", "1.0.0").require("bar", ">= 2.0.0"),
        );

        assert!(result.is_satisfied);
        assert_eq!(result.message, "");
        let top = result.package("top").unwrap();
        assert_eq!(top.versions, vec!["1.0.0"]);
        assert!(top.is_satisfied);
        let bar = result.package("bar").unwrap();
        assert_eq!(bar.versions, vec!["3.0.0", "2.0.0"]);
        assert!(bar.is_satisfied);
        assert!(result.assert(None).is_ok());
    }

    #[test]
    fn test_unsatisfied_requirement() {
        let tree = tree();
        let result = check(&tree, &Requirements::new().require("top", "2.0.0"));

        assert!(!result.is_satisfied);
        assert!(
            result
                .message
                .contains("'top' expected version: [2.0.0] but got version: [1.0.0]")
        );
    }

    #[test]
    fn test_every_installed_version_must_satisfy() {
        let tree = tree();
        let result = check(&tree, &Requirements::new().require("bar", ">= 3.0.0"));

        let bar = result.package("bar").unwrap();
        assert!(!bar.is_satisfied);
        assert_eq!(
            bar.message,
            "'bar' expected version: [>= 3.0.0] but got versions: [3.0.0, 2.0.0]"
        );
    }

    #[test]
    fn test_install_without_version_fails_and_is_named() {
        let tree = AddonNode::new("app", "/app")
            .with_addon(AddonNode::new("bar", "/app/node_modules/bar"))
            .with_addon(
                AddonNode::new("baz", "/app/node_modules/baz")
                    .with_addon(AddonNode::new("bar", "/app/node_modules/baz/node_modules/bar").with_version("2.0.0")),
            );
        let result = check(&tree, &Requirements::new().require("bar", "*"));

        let bar = result.package("bar").unwrap();
        assert!(!bar.is_satisfied);
        assert_eq!(bar.versions, vec!["2.0.0"]);
        assert_eq!(
            bar.message,
            "'bar' expected version: [*] but got versions: [2.0.0, <unknown>]"
        );
    }

    #[test]
    fn test_missing_package_fails() {
        let tree = tree();
        let result = check(&tree, &Requirements::new().require("never-ever-ever", "*"));

        let missing = result.package("never-ever-ever").unwrap();
        assert!(!missing.is_satisfied);
        assert!(missing.versions.is_empty());
        assert_eq!(
            missing.message,
            "'never-ever-ever' expected version: [*] but it was not found"
        );
    }

    #[test]
    fn test_invalid_range_fails_the_package() {
        let tree = tree();
        let result = check(&tree, &Requirements::new().require("top", ">= >="));

        assert!(!result.is_satisfied);
        assert!(result.package("top").unwrap().message.starts_with("'top' cannot be checked"));
    }

    #[test]
    fn test_aggregate_message_and_assert() {
        let tree = tree();
        let result = check(
            &tree,
            &Requirements::new()
                .require("top", "2.0.0")
                .require("foo", "1.0.0")
                .require("bar", "^3.0.0"),
        );

        assert_eq!(
            result.message,
            "  - 'top' expected version: [2.0.0] but got version: [1.0.0]\n  - 'bar' expected version: [^3.0.0] but got versions: [3.0.0, 2.0.0]"
        );

        let err = result.assert(Some("rsvp needs a newer toolchain")).unwrap_err();
        assert!(err.is_policy_violation());
        assert_eq!(
            err.to_string(),
            format!(
                "Checker Assertion Failed\nrsvp needs a newer toolchain\n{}",
                result.message
            )
        );

        let err = result.assert(None).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Checker Assertion Failed\n{}", result.message)
        );
    }

    #[test]
    fn test_requirements_keep_insertion_order_and_replace() {
        let requirements: Requirements = [("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();

        assert_eq!(requirements.names(), vec!["b", "a"]);
        assert_eq!(requirements.iter().next().unwrap().range, "3");
    }

    #[test]
    fn test_requirements_serialize_as_ordered_map() {
        let requirements = Requirements::new().require("top", "1.0.0").require("bar", ">= 2.0.0");

        let json = serde_json::to_string(&requirements).unwrap();
        assert_eq!(json, r#"{"top":"1.0.0","bar":">= 2.0.0"}"#);

        let back: Requirements = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.iter().find(|r| r.name == "bar").unwrap().range, ">= 2.0.0");
    }

    #[test]
    fn test_result_serializes_packages_by_name() {
        let tree = tree();
        let result = check(
            &tree,
            &Requirements::new().require("top", "1.0.0").require("bar", ">= 2.0.0"),
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_satisfied"], serde_json::json!(true));
        assert_eq!(json["node_modules"]["top"]["versions"], serde_json::json!(["1.0.0"]));
        assert_eq!(
            json["node_modules"]["bar"]["versions"],
            serde_json::json!(["3.0.0", "2.0.0"])
        );
    }

    #[test]
    fn test_requirements_deserialize_from_map() {
        let requirements: Requirements =
            serde_json::from_str(r#"{"top": "1.0.0", "bar": ">= 2.0.0"}"#).unwrap();

        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements.names(), vec!["bar", "top"]);
    }
}
