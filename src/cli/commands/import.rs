//! Import command - Load bordereaux from a JSON file

use std::path::Path;

use crate::cli::open_engine;
use crate::errors::Result;
use crate::fs::{read_json, resolve_cwd};
use crate::schemas::Bordereau;

/// Import every document of `file` (a JSON array) into the workspace store
pub async fn run(cwd: Option<&Path>, file: &Path) -> Result<()> {
    let engine = open_engine(cwd)?;
    let path = resolve_cwd(cwd).join(file);
    let docs: Vec<Bordereau> = read_json(&path)?;

    let count = engine.import(docs)?;
    println!("Imported {} bordereau(x)", count);
    Ok(())
}
