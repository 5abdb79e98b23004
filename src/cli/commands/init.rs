//! Init command - Initialize a bordereaux workspace

use std::path::Path;

use tracing::info;

use crate::errors::{BsdError, Result};
use crate::fs::{
    get_config_path, get_directory_path, get_store_path, get_workspace_dir, resolve_cwd,
    write_json,
};
use crate::schemas::{DirectorySnapshot, EngineConfig};
use crate::store::StoreSnapshot;

/// Create `.bordereaux/` with a default config, an empty store and an
/// empty directory snapshot. Existing store and directory files are kept.
pub async fn run(cwd: Option<&Path>, force: bool) -> Result<()> {
    let root = resolve_cwd(cwd);
    let workspace = get_workspace_dir(&root);
    if workspace.exists() && !force {
        return Err(BsdError::ConfigError(format!(
            "{} already exists; use --force to rewrite its configuration",
            workspace.display()
        )));
    }

    write_json(&get_config_path(&root), &EngineConfig::default())?;

    let store_path = get_store_path(&root);
    if !store_path.exists() {
        write_json(&store_path, &StoreSnapshot::default())?;
    }
    let directory_path = get_directory_path(&root);
    if !directory_path.exists() {
        write_json(&directory_path, &DirectorySnapshot::default())?;
    }

    info!(path = %workspace.display(), "workspace initialized");
    println!("Initialized bordereaux workspace in {}", workspace.display());
    Ok(())
}
