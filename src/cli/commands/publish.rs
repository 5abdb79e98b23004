//! Publish command - Turn a draft into a signable bordereau

use std::path::Path;

use crate::cli::open_engine;
use crate::errors::Result;
use crate::schemas::{BordereauId, UserId};

/// Publish the draft `id` as `user`
pub async fn run(cwd: Option<&Path>, id: &str, user: &str) -> Result<()> {
    let engine = open_engine(cwd)?;
    let doc = engine.publish(&BordereauId::from(id), &UserId::from(user))?;
    println!("Published {}: status is now {}", doc.id, doc.status);
    Ok(())
}
