//! List command - List bordereaux with optional filtering

use std::path::Path;

use crate::cli::open_engine;
use crate::domain::next_expected_stage;
use crate::errors::{BsdError, Result};
use crate::schemas::{Bordereau, Status};

fn select(docs: Vec<Bordereau>, status: Option<Status>) -> Vec<Bordereau> {
    docs.into_iter()
        .filter(|doc| status.map_or(true, |s| doc.status == s))
        .collect()
}

/// List bordereaux, optionally only those with `status`
pub async fn run(cwd: Option<&Path>, json: bool, status: Option<Status>) -> Result<()> {
    let engine = open_engine(cwd)?;
    let docs = select(engine.list()?, status);

    if json {
        let output = serde_json::to_string_pretty(&docs)
            .map_err(|e| BsdError::wrap(e, "Failed to serialize bordereaux"))?;
        println!("{}", output);
        return Ok(());
    }

    if docs.is_empty() {
        println!("No bordereaux found");
        return Ok(());
    }
    for doc in &docs {
        let next = next_expected_stage(doc)
            .map(|stage| stage.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<20} {:<18} next: {}",
            doc.id.to_string(),
            doc.family.to_string(),
            doc.status.to_string(),
            next
        );
    }
    Ok(())
}
