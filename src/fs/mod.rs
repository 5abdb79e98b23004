//! File system utilities for bordereaux workspaces
//!
//! Provides path resolution and JSON file operations.

mod json;
mod paths;

pub use json::{read_config, read_directory, read_json, write_json};
pub use paths::{
    find_workspace_root, get_config_path, get_directory_path, get_store_path, get_workspace_dir,
    resolve_cwd, WORKSPACE_DIR,
};
