//! Package manifest writers.

use std::fs;
use std::path::Path;

use serde_json::json;

/// Writes `<dir>/package.json` declaring `name` and, when given, `version`.
/// Creates `dir` if needed.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn write_manifest(dir: &Path, name: &str, version: Option<&str>) {
    let mut manifest = json!({ "name": name });
    if let Some(version) = version {
        manifest["version"] = json!(version);
    }
    let content = serde_json::to_string_pretty(&manifest)
        .unwrap_or_else(|e| panic!("write_manifest: failed to serialize manifest: {e}"));
    write_raw_manifest(dir, &content);
}

/// Writes `content` verbatim as `<dir>/package.json`.
///
/// Use for: malformed or unusual manifests.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn write_raw_manifest(dir: &Path, content: &str) {
    fs::create_dir_all(dir).unwrap_or_else(|e| {
        panic!(
            "write_raw_manifest: failed to create {}: {e}",
            dir.display()
        )
    });
    fs::write(dir.join("package.json"), content).unwrap_or_else(|e| {
        panic!(
            "write_raw_manifest: failed to write manifest in {}: {e}",
            dir.display()
        )
    });
}
