//! Plain file reads with path-carrying errors

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Return the first ancestor of `start` (including `start`) that contains
/// an entry called `file_name`.
pub fn find_upwards(start: &Path, file_name: &str) -> Option<std::path::PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}
