//! Path resolution utilities for bordereaux workspaces
//!
//! A workspace is any directory holding a `.bordereaux` directory; the
//! store, directory snapshot and configuration live inside it.

use std::path::{Path, PathBuf};

use crate::errors::{BsdError, Result};

/// Name of the workspace data directory
pub const WORKSPACE_DIR: &str = ".bordereaux";

/// Find the workspace root containing a .bordereaux directory.
///
/// Walks up the directory tree from the starting directory.
///
/// # Errors
/// * `WorkspaceNotFound` - If no ancestor holds a .bordereaux directory
pub fn find_workspace_root(start_cwd: &Path) -> Result<PathBuf> {
    let mut current = start_cwd
        .canonicalize()
        .map_err(|e| BsdError::WorkspaceNotFound(format!("Cannot resolve path: {}", e)))?;

    loop {
        if get_workspace_dir(&current).is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent.to_path_buf();
            }
            _ => {
                return Err(BsdError::WorkspaceNotFound(format!(
                    "Could not find a {} directory; run `bsd init` first",
                    WORKSPACE_DIR
                )));
            }
        }
    }
}

/// Resolve the current working directory, optionally using an override.
pub fn resolve_cwd(cwd_option: Option<&Path>) -> PathBuf {
    match cwd_option {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Get the path to the .bordereaux directory.
pub fn get_workspace_dir(root: &Path) -> PathBuf {
    root.join(WORKSPACE_DIR)
}

/// Get the path to the config.json file.
pub fn get_config_path(root: &Path) -> PathBuf {
    get_workspace_dir(root).join("config.json")
}

/// Get the path to the store.json file.
pub fn get_store_path(root: &Path) -> PathBuf {
    get_workspace_dir(root).join("store.json")
}

/// Get the path to the directory.json identity snapshot.
pub fn get_directory_path(root: &Path) -> PathBuf {
    get_workspace_dir(root).join("directory.json")
}
