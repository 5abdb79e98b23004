//! Sign command - Apply one signature to a bordereau

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::cli::{linked_changes, open_engine_with_events};
use crate::engine::SignRequest;
use crate::errors::Result;
use crate::schemas::StageKind;

/// Options of a signature request
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    pub author: Option<String>,
    pub code: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Sign `id` for `signature_type` as `user`
pub async fn run(
    cwd: Option<&Path>,
    id: &str,
    signature_type: StageKind,
    user: &str,
    options: SignOptions,
) -> Result<()> {
    let (engine, mut events) = open_engine_with_events(cwd)?;

    let mut request = SignRequest::new(id, signature_type, user);
    request.author = options.author;
    request.security_code = options.code;
    request.date = options.date;

    let doc = engine.apply_signature(request)?;
    println!("Signed {} for {}: status is now {}", doc.id, signature_type, doc.status);
    for line in linked_changes(&mut events, &doc.id) {
        println!("  {}", line);
    }
    Ok(())
}
