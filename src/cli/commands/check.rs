//! Check command - Report missing fields for a stage without signing

use std::path::Path;

use crate::cli::open_engine;
use crate::errors::{BsdError, Result};
use crate::schemas::{BordereauId, StageKind};

/// Validate `id` for `stage`; missing fields are returned as a validation error
pub async fn run(cwd: Option<&Path>, id: &str, stage: StageKind) -> Result<()> {
    let engine = open_engine(cwd)?;
    let issues = engine.check(&BordereauId::from(id), stage)?;

    if issues.is_empty() {
        println!("{} is complete for {}", id, stage);
        return Ok(());
    }
    for issue in &issues {
        println!("  {}", issue);
    }
    Err(BsdError::ValidationFailed { issues })
}
