//! Show command - Show details of a bordereau

use std::path::Path;

use crate::cli::open_engine;
use crate::domain::{document_stages, next_expected_stage};
use crate::errors::{BsdError, Result};
use crate::schemas::{Bordereau, BordereauId};

/// Human readable summary of a document and its signatures
fn render(doc: &Bordereau) -> String {
    let mut lines = vec![
        format!("Bordereau {} ({}, {})", doc.id, doc.family, doc.subtype),
        format!("Status: {}", doc.status),
    ];

    for stage in document_stages(doc) {
        let line = match doc.signature(stage) {
            Some(record) => format!(
                "  {:<12} signed by {} ({}) on {}",
                stage.to_string(),
                record.author,
                record.signatory,
                record.date.to_rfc3339()
            ),
            None => format!("  {:<12} -", stage.to_string()),
        };
        lines.push(line);
    }

    if let Some(next) = next_expected_stage(doc) {
        lines.push(format!("Next stage: {}", next));
    }
    let links = [
        ("Forwards", &doc.links.forwarding_of),
        ("Grouped into", &doc.links.grouped_into),
        ("Synthesized by", &doc.links.synthesized_by),
        ("Processed by", &doc.processed_downstream_by),
    ];
    for (label, target) in links {
        if let Some(target) = target {
            lines.push(format!("{}: {}", label, target));
        }
    }
    lines.join("\n")
}

/// Show one bordereau
pub async fn run(cwd: Option<&Path>, id: &str, json: bool) -> Result<()> {
    let engine = open_engine(cwd)?;
    let doc = engine.get(&BordereauId::from(id))?;

    if json {
        let output = serde_json::to_string_pretty(&doc)
            .map_err(|e| BsdError::wrap(e, "Failed to serialize bordereau"))?;
        println!("{}", output);
    } else {
        println!("{}", render(&doc));
    }
    Ok(())
}
