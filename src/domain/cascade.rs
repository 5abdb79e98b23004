//! Chain cascade propagation
//!
//! Consequences of a signature on linked documents, applied inside the
//! same unit of work as the signature itself:
//! - a synthesis document copies its signature onto every synthesized document
//! - final treatment closes the whole ancestry of the chain
//! - refusal releases grouped documents and the forwarding link
//! - deletion detaches every document still linked to the deleted one

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::errors::{BsdError, Result};
use crate::schemas::{
    Bordereau, BordereauId, EngineConfig, LinkKind, SignatureRecord, Stage, StageKind, Status,
    Subtype,
};
use crate::store::UnitOfWork;

use super::status::derive_status;

/// A document changed by the cascade, with its status before the change
#[derive(Debug, Clone)]
pub struct CascadeChange {
    pub previous: Status,
    pub doc: Bordereau,
}

/// Settings for one propagation
#[derive(Debug, Clone, Copy)]
pub struct CascadeContext<'a> {
    pub config: &'a EngineConfig,
    pub now: DateTime<Utc>,
}

/// Propagate the signature of `stage` on `doc` to linked documents.
///
/// `doc` is the freshly signed document and `previous` its status before
/// signing. The document itself may be modified (its forwarding link is
/// cleared on refusal); every other changed document is staged in `uow`
/// and returned.
pub fn propagate(
    uow: &mut dyn UnitOfWork,
    doc: &mut Bordereau,
    stage: Stage,
    previous: Status,
    ctx: CascadeContext<'_>,
) -> Result<Vec<CascadeChange>> {
    let mut changes = Vec::new();

    if doc.subtype == Subtype::Synthesis && stage.kind() >= StageKind::Transport {
        copy_to_synthesized(uow, doc, stage, ctx, &mut changes)?;
    }

    if doc.status == Status::Processed && previous != Status::Processed {
        let mut tails = vec![doc.clone()];
        tails.extend(
            changes
                .iter()
                .filter(|c| c.doc.status == Status::Processed && c.previous != Status::Processed)
                .map(|c| c.doc.clone()),
        );
        for tail in &tails {
            close_ancestors(uow, tail, ctx, &mut changes)?;
        }
    }

    if doc.status == Status::Refused && previous != Status::Refused {
        release(uow, doc, ctx, &mut changes);
    }

    Ok(changes)
}

fn copy_to_synthesized(
    uow: &mut dyn UnitOfWork,
    parent: &Bordereau,
    stage: Stage,
    ctx: CascadeContext<'_>,
    changes: &mut Vec<CascadeChange>,
) -> Result<()> {
    let record: SignatureRecord = match parent.signature(stage) {
        Some(record) => record.clone(),
        None => return Ok(()),
    };

    let children = uow.linked_to(&parent.id, LinkKind::SynthesizedBy);
    debug!(id = %parent.id, %stage, children = children.len(), "copying synthesis signature");

    for mut child in children {
        if child.is_signed(stage) {
            return Err(BsdError::TransactionFailed(format!(
                "synthesized bordereau {} already carries a {} signature",
                child.id, stage
            )));
        }
        let previous = child.status;
        child.signatures.insert(stage, record.clone());
        if stage >= Stage::Reception {
            child.payload.destination.reception = parent.payload.destination.reception.clone();
            child.payload.destination.operation = parent.payload.destination.operation.clone();
        }
        child.status = derive_status(&child);
        child.updated_at = ctx.now;
        uow.put(child.clone());
        changes.push(CascadeChange {
            previous,
            doc: child,
        });
    }
    Ok(())
}

fn chain_failure(message: String) -> BsdError {
    BsdError::TransactionFailed(message)
}

/// Direct ancestors: the document this one forwards, and documents
/// grouped into it.
fn ancestors_of(uow: &dyn UnitOfWork, node: &Bordereau) -> Result<Vec<Bordereau>> {
    let mut ancestors = Vec::new();
    if let Some(id) = &node.links.forwarding_of {
        let forwarded = uow.get(id).map_err(|_| {
            chain_failure(format!(
                "bordereau {} forwards missing bordereau {}",
                node.id, id
            ))
        })?;
        ancestors.push(forwarded);
    }
    ancestors.extend(uow.linked_to(&node.id, LinkKind::GroupedInto));
    Ok(ancestors)
}

/// Mark every ancestor of `tail` processed, walking at most
/// `max_chain_depth` hops.
fn close_ancestors(
    uow: &mut dyn UnitOfWork,
    tail: &Bordereau,
    ctx: CascadeContext<'_>,
    changes: &mut Vec<CascadeChange>,
) -> Result<()> {
    let mut visited: HashSet<BordereauId> = HashSet::new();
    visited.insert(tail.id.clone());
    let mut queue: VecDeque<(Bordereau, usize)> = VecDeque::new();
    queue.push_back((tail.clone(), 0));

    while let Some((node, depth)) = queue.pop_front() {
        for ancestor in ancestors_of(uow, &node)? {
            if depth + 1 > ctx.config.max_chain_depth {
                return Err(chain_failure(format!(
                    "chain ending at {} is deeper than {} documents",
                    tail.id, ctx.config.max_chain_depth
                )));
            }
            if !visited.insert(ancestor.id.clone()) {
                return Err(chain_failure(format!(
                    "cycle detected in the chain ending at {} (bordereau {})",
                    tail.id, ancestor.id
                )));
            }
            if derive_status(&ancestor) == Status::Refused {
                continue;
            }

            let previous = ancestor.status;
            let mut closed = ancestor;
            closed.processed_downstream_by = Some(tail.id.clone());
            closed.status = derive_status(&closed);
            closed.updated_at = ctx.now;
            uow.put(closed.clone());
            info!(id = %closed.id, tail = %tail.id, depth = depth + 1, "ancestor processed by chain tail");

            changes.push(CascadeChange {
                previous,
                doc: closed.clone(),
            });
            queue.push_back((closed, depth + 1));
        }
    }
    Ok(())
}

/// Release documents grouped into a refused document and clear its own
/// forwarding link.
fn release(
    uow: &mut dyn UnitOfWork,
    doc: &mut Bordereau,
    ctx: CascadeContext<'_>,
    changes: &mut Vec<CascadeChange>,
) {
    for mut child in uow.linked_to(&doc.id, LinkKind::GroupedInto) {
        let previous = child.status;
        child.links.grouped_into = None;
        child.status = derive_status(&child);
        child.updated_at = ctx.now;
        uow.put(child.clone());
        info!(id = %child.id, group = %doc.id, status = %child.status, "released from refused group");
        changes.push(CascadeChange {
            previous,
            doc: child,
        });
    }

    if let Some(forwarded) = doc.links.forwarding_of.take() {
        info!(id = %doc.id, %forwarded, "refused forwarding document released its source");
    }
}

/// Unlink every document attached to `doc` before it is soft-deleted.
///
/// Grouped and synthesized documents lose their link and get their status
/// re-derived; `doc` drops its own forwarding reference.
pub fn detach(
    uow: &mut dyn UnitOfWork,
    doc: &mut Bordereau,
    now: DateTime<Utc>,
) -> Vec<CascadeChange> {
    let mut changes = Vec::new();
    for kind in [LinkKind::GroupedInto, LinkKind::SynthesizedBy] {
        for mut child in uow.linked_to(&doc.id, kind) {
            let previous = child.status;
            match kind {
                LinkKind::GroupedInto => child.links.grouped_into = None,
                LinkKind::SynthesizedBy => child.links.synthesized_by = None,
                LinkKind::ForwardingOf => {}
            }
            child.status = derive_status(&child);
            child.updated_at = now;
            uow.put(child.clone());
            info!(id = %child.id, parent = %doc.id, status = %child.status, "detached from deleted document");
            changes.push(CascadeChange {
                previous,
                doc: child,
            });
        }
    }

    if let Some(forwarded) = doc.links.forwarding_of.take() {
        info!(id = %doc.id, %forwarded, "deleted forwarding document released its source");
    }
    changes
}
