//! Status derivation
//!
//! Status is a pure function of the signature set and the payload's
//! branch flags. Nothing else may assign a status.

use crate::schemas::{Acceptation, Bordereau, Stage, Status};

use super::operations::{classify, OperationKind};
use super::stages::{acceptance_stage, decision_stage, waiting_status};

/// Compute the status of a document from its signatures and payload.
pub fn derive_status(doc: &Bordereau) -> Status {
    if doc.is_draft {
        return Status::Draft;
    }
    if doc.processed_downstream_by.is_some() {
        return Status::Processed;
    }

    let decision = decision_stage(doc.family);
    if doc.is_signed(decision) {
        return decision_outcome(doc);
    }

    if acceptance_stage(doc.family) == Stage::Reception && doc.is_signed(Stage::Reception) {
        return if doc.payload.destination.is_totally_refused() {
            Status::Refused
        } else {
            Status::Received
        };
    }

    if doc.any_transport_signed() {
        return Status::Sent;
    }
    if doc.is_signed(Stage::Work) {
        return Status::SignedByWorker;
    }
    if doc.is_signed(Stage::Emission) {
        return Status::SignedByProducer;
    }
    Status::Initial
}

/// Status once the decision stage carries a signature.
fn decision_outcome(doc: &Bordereau) -> Status {
    let destination = &doc.payload.destination;
    if destination.reception.acceptation == Some(Acceptation::Refused) {
        return Status::Refused;
    }

    let kind = destination
        .operation
        .code
        .as_deref()
        .and_then(|code| classify(doc.family, code));
    match kind {
        Some(OperationKind::Continuation) => waiting_status(doc.family),
        Some(OperationKind::Final) | None => Status::Processed,
    }
}
