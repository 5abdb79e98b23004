//! Stage transition logic
//!
//! Pure functions resolving which stage a request targets, checking that
//! the document may be signed at that stage now, and applying the
//! signature to a copy of the document.

use chrono::{DateTime, Utc};

use crate::errors::{BsdError, Result};
use crate::schemas::{
    Bordereau, EngineConfig, Family, OperationMode, SignatureRecord, Stage, StageKind, Subtype,
};

use super::authorization::SignerAuthorization;
use super::operations::resolve_operation;
use super::rules::has_active_worker;
use super::stages::{decision_stage, has_stage, supports_subtype};
use super::status::derive_status;

/// Message returned when a synthesis document is signed for emission
pub const SYNTHESIS_EMISSION_MESSAGE: &str =
    "a synthesis document in this state expects the transporter's signature, not the producer's";

/// Resolve the concrete stage targeted by a signature type.
///
/// Transport resolves to the first transporter, by position, who has not
/// signed yet.
pub fn resolve_stage(doc: &Bordereau, kind: StageKind) -> Result<Stage> {
    if !has_stage(doc.family, kind) {
        return Err(BsdError::InvalidDocumentStateForStage(format!(
            "{} documents have no {} stage",
            doc.family, kind
        )));
    }
    if kind != StageKind::Transport {
        return Ok(kind.first_stage());
    }
    if doc.actors.transporters.is_empty() {
        return Err(BsdError::InvalidDocumentStateForStage(format!(
            "bordereau {} declares no transporter",
            doc.id
        )));
    }
    match doc.next_unsigned_transporter() {
        Some(n) => Ok(Stage::Transport(n)),
        None => Err(BsdError::AlreadySigned(format!(
            "every transporter of bordereau {} has already signed",
            doc.id
        ))),
    }
}

/// External facts the sequencing rules depend on
#[derive(Debug, Clone, Copy, Default)]
pub struct SequencingContext {
    /// The producer organization opted in to takeover without signature
    pub producer_allows_takeover: bool,
}

/// Outcome of a successful sequencing check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequencing {
    /// Transport starts without any producer signature
    pub direct_takeover: bool,
}

fn invalid_state(message: impl Into<String>) -> BsdError {
    BsdError::InvalidDocumentStateForStage(message.into())
}

fn wrong_order(doc: &Bordereau, stage: Stage, missing: Stage) -> BsdError {
    BsdError::WrongStageOrder(format!(
        "bordereau {} cannot be signed for {} before {} is signed",
        doc.id, stage, missing
    ))
}

/// Check structural rules and stage ordering for signing `stage` now.
pub fn check_sequencing(
    doc: &Bordereau,
    stage: Stage,
    ctx: &SequencingContext,
) -> Result<Sequencing> {
    if doc.is_draft {
        return Err(invalid_state(format!(
            "bordereau {} is a draft and must be published before it can be signed",
            doc.id
        )));
    }
    if !supports_subtype(doc.family, doc.subtype) {
        return Err(invalid_state(format!(
            "{} documents do not support the {} subtype",
            doc.family, doc.subtype
        )));
    }
    check_subtype_restrictions(doc, stage)?;

    if doc.has_signature_after(stage) {
        return Err(BsdError::WrongStageOrder(format!(
            "bordereau {} already carries a signature later than {}",
            doc.id, stage
        )));
    }

    match stage {
        Stage::Emission => Ok(Sequencing::default()),
        Stage::Work => check_work(doc, stage),
        Stage::Transport(n) if n > 1 => {
            let previous = Stage::Transport(n - 1);
            if doc.is_signed(previous) {
                Ok(Sequencing::default())
            } else {
                Err(wrong_order(doc, stage, previous))
            }
        }
        Stage::Transport(_) => check_first_transport(doc, stage, ctx),
        Stage::Reception | Stage::Operation => check_destination(doc, stage),
    }
}

fn check_subtype_restrictions(doc: &Bordereau, stage: Stage) -> Result<()> {
    match doc.subtype {
        Subtype::CollectionPoint if stage != Stage::Operation => {
            return Err(invalid_state(format!(
                "a collection point document only accepts the destination's operation signature, not {}",
                stage
            )));
        }
        Subtype::Synthesis if stage == Stage::Emission => {
            return Err(invalid_state(SYNTHESIS_EMISSION_MESSAGE));
        }
        Subtype::Grouping | Subtype::Forwarding
            if doc.family == Family::Asbestos && stage == Stage::Work =>
        {
            return Err(invalid_state(format!(
                "a {} asbestos document has no worker signature",
                doc.subtype
            )));
        }
        _ => {}
    }

    if let Some(synthesis) = &doc.links.synthesized_by {
        if stage.kind() >= StageKind::Transport {
            return Err(invalid_state(format!(
                "bordereau {} is part of synthesis {}; its {} signature is applied by the synthesis document",
                doc.id, synthesis, stage
            )));
        }
    }
    Ok(())
}

fn check_work(doc: &Bordereau, stage: Stage) -> Result<Sequencing> {
    if !has_active_worker(doc) {
        return Err(invalid_state(format!(
            "bordereau {} has no active worker",
            doc.id
        )));
    }
    let emission_waived = doc.payload.worker.has_emitter_paper_signature
        || doc.actors.producer.is_private_individual;
    if doc.is_signed(Stage::Emission) || emission_waived {
        Ok(Sequencing::default())
    } else {
        Err(wrong_order(doc, stage, Stage::Emission))
    }
}

fn check_first_transport(
    doc: &Bordereau,
    stage: Stage,
    ctx: &SequencingContext,
) -> Result<Sequencing> {
    let mut sequencing = Sequencing::default();

    if !doc.is_signed(Stage::Emission) {
        let private_individual = doc.actors.producer.is_private_individual
            && matches!(
                doc.family,
                Family::Standard | Family::Asbestos | Family::EndOfLifeVehicle
            );
        let synthesis = doc.subtype == Subtype::Synthesis;
        let takeover = doc.family == Family::MedicalWaste && ctx.producer_allows_takeover;

        if takeover && !private_individual && !synthesis {
            sequencing.direct_takeover = true;
        } else if !(private_individual || synthesis) {
            return Err(wrong_order(doc, stage, Stage::Emission));
        }
    }

    if expects_work(doc) && !doc.is_signed(Stage::Work) {
        return Err(wrong_order(doc, stage, Stage::Work));
    }
    Ok(sequencing)
}

/// The worker has to sign before transport can start
fn expects_work(doc: &Bordereau) -> bool {
    has_stage(doc.family, StageKind::Work)
        && has_active_worker(doc)
        && !matches!(doc.subtype, Subtype::Grouping | Subtype::Forwarding)
}

fn check_destination(doc: &Bordereau, stage: Stage) -> Result<Sequencing> {
    if doc.subtype == Subtype::CollectionPoint {
        // Signed straight from the initial state by the destination.
        return Ok(Sequencing::default());
    }
    if !doc.is_signed(Stage::Transport(1)) {
        return Err(wrong_order(doc, stage, Stage::Transport(1)));
    }
    if stage == Stage::Operation && has_stage(doc.family, StageKind::Reception) {
        if !doc.is_signed(Stage::Reception) {
            return Err(wrong_order(doc, stage, Stage::Reception));
        }
        if doc.payload.destination.is_totally_refused() {
            return Err(invalid_state(format!(
                "bordereau {} was refused at reception and cannot be treated",
                doc.id
            )));
        }
    }
    Ok(Sequencing::default())
}

/// Everything needed to write one signature
#[derive(Debug, Clone)]
pub struct SignatureInput {
    pub stage: Stage,
    pub record: SignatureRecord,
    pub authorization: SignerAuthorization,
    pub sequencing: Sequencing,
    pub now: DateTime<Utc>,
}

/// Apply a signature to a copy of the document and recompute its status.
///
/// Never mutates the input document.
pub fn apply_signature(
    doc: &Bordereau,
    input: SignatureInput,
    config: &EngineConfig,
) -> Result<Bordereau> {
    let mut next = doc.clone();
    next.record_signature(input.stage, input.record)?;

    if input.stage == Stage::Emission && input.authorization == SignerAuthorization::SecurityCode {
        next.is_emission_taken_over_with_secret_code = true;
    }
    if input.sequencing.direct_takeover {
        next.is_direct_takeover = true;
    }
    if let Some(n) = input.stage.transporter_number() {
        if let Some(transporter) = (n as usize)
            .checked_sub(1)
            .and_then(|i| next.actors.transporters.get_mut(i))
        {
            transporter.taken_over_at.get_or_insert(input.now);
        }
    }

    if input.stage == decision_stage(next.family) {
        if config.drop_unsigned_transporters_on_operation {
            drop_unsigned_transporters(&mut next);
        }
        fill_legacy_operation(&mut next);
    }

    next.status = derive_status(&next);
    next.updated_at = input.now;
    Ok(next)
}

/// Remove transporters that never signed; the last signed leg went
/// straight to the destination.
fn drop_unsigned_transporters(doc: &mut Bordereau) {
    let signed: Vec<bool> = (1..=doc.actors.transporters.len())
        .map(|n| u8::try_from(n).map_or(false, |n| doc.is_signed(Stage::Transport(n))))
        .collect();
    let mut flags = signed.into_iter();
    doc.actors
        .transporters
        .retain(|_| flags.next().unwrap_or(false));
}

/// Rewrite a legacy medical waste `D 9` into `D 9 F` with its mode.
fn fill_legacy_operation(doc: &mut Bordereau) {
    let operation = &mut doc.payload.destination.operation;
    let resolved = match operation.code.as_deref() {
        Some(code) => resolve_operation(doc.family, code),
        None => None,
    };
    if let Some(resolved) = resolved {
        if resolved.legacy_d9 {
            operation.code = Some(resolved.code);
            operation.mode.get_or_insert(OperationMode::Elimination);
        }
    }
}
