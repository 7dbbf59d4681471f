//! Maps caller-supplied virtual paths onto the configured root.
//!
//! Virtual paths are `/`-separated and always relative to the root, whether
//! or not they start with `/`. Empty and `.` segments are dropped and `..`
//! pops the previous segment. A `..` with nothing left to pop would leave the
//! root and is rejected.

use std::path::{Path, PathBuf};

use common::FsError;

fn segments(virtual_path: &str) -> Result<Vec<&str>, FsError> {
    let mut parts = Vec::new();
    for segment in virtual_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(FsError::InvalidArgument("path escapes root".to_string()));
                }
            }
            s => parts.push(s),
        }
    }
    Ok(parts)
}

/// Canonical virtual form, e.g. `dir1//./x/../file` becomes `/dir1/file`.
pub fn normalize(virtual_path: &str) -> Result<String, FsError> {
    Ok(format!("/{}", segments(virtual_path)?.join("/")))
}

/// Virtual path of `name` inside the canonical directory `parent`.
pub fn child(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Absolute location of `virtual_path` under `root`. The result is always
/// `root` itself or lies below it.
pub fn resolve(root: &Path, virtual_path: &str) -> Result<PathBuf, FsError> {
    let mut full = root.to_path_buf();
    for segment in segments(virtual_path)? {
        full.push(segment);
    }
    Ok(full)
}
