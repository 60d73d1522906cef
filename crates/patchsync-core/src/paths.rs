//! Installation path helpers.

use std::path::{Component, Path, PathBuf};

use crate::sync::SyncError;

/// Strip trailing separators and `.` segments from an installation root.
pub fn normalize_install_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Create the installation root if it does not exist yet.
pub fn ensure_install_dir(path: &Path) -> Result<(), SyncError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(SyncError::Io {
                path: path.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| SyncError::io(path, &e))
}

/// Default log directory: a `logs` sibling of the installation root.
///
/// Relative roots are resolved against the working directory first, so the
/// log never lands inside the tree being policed.
pub fn default_log_dir(install_dir: &Path) -> PathBuf {
    let root = std::path::absolute(install_dir)
        .or_else(|_| std::env::current_dir().map(|cwd| cwd.join(install_dir)))
        .unwrap_or_else(|_| install_dir.to_path_buf());
    root.parent()
        .map_or_else(|| root.join("logs"), |parent| parent.join("logs"))
}

/// Express `path` relative to the installation root.
///
/// Relative inputs are taken as already relative; absolute inputs must
/// live under `install_dir`.
pub fn relative_to_install(install_dir: &Path, path: &Path) -> Option<PathBuf> {
    if path.is_relative() {
        let cleaned = normalize_install_dir(path);
        let escapes = cleaned
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        return (!escapes && !cleaned.as_os_str().is_empty()).then_some(cleaned);
    }
    path.strip_prefix(install_dir)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
