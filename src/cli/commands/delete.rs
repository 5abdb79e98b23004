//! Delete command - Soft-delete a bordereau

use std::path::Path;

use crate::cli::{linked_changes, open_engine_with_events};
use crate::errors::Result;
use crate::schemas::{BordereauId, UserId};

/// Delete `id` as `user`
pub async fn run(cwd: Option<&Path>, id: &str, user: &str) -> Result<()> {
    let (engine, mut events) = open_engine_with_events(cwd)?;
    let id = BordereauId::from(id);
    engine.delete(&id, &UserId::from(user))?;
    println!("Deleted {}", id);
    for line in linked_changes(&mut events, &id) {
        println!("  detached {}", line);
    }
    Ok(())
}
