//! Stage tables per document family
//!
//! Every family follows the same shape:
//! emission → work (optional) → transport ×N → reception → operation
//! with some stages absent depending on the family.

use crate::schemas::{Bordereau, Family, Stage, StageKind, Status, Subtype};

/// Stage kinds of the standard family, in lifecycle order
pub const STANDARD_STAGES: &[StageKind] = &[
    StageKind::Emission,
    StageKind::Transport,
    StageKind::Reception,
    StageKind::Operation,
];

/// Stage kinds of the asbestos family, in lifecycle order
pub const ASBESTOS_STAGES: &[StageKind] = &[
    StageKind::Emission,
    StageKind::Work,
    StageKind::Transport,
    StageKind::Operation,
];

/// Stage kinds of the medical waste family, in lifecycle order
pub const MEDICAL_WASTE_STAGES: &[StageKind] = &[
    StageKind::Emission,
    StageKind::Transport,
    StageKind::Reception,
    StageKind::Operation,
];

/// Stage kinds of the end-of-life vehicle family, in lifecycle order
pub const END_OF_LIFE_VEHICLE_STAGES: &[StageKind] = &[
    StageKind::Emission,
    StageKind::Transport,
    StageKind::Operation,
];

/// Stage kinds of the human remains family, in lifecycle order
pub const HUMAN_REMAINS_STAGES: &[StageKind] = &[
    StageKind::Emission,
    StageKind::Transport,
    StageKind::Reception,
    StageKind::Operation,
];

/// The stage table of a family.
pub fn stage_kinds(family: Family) -> &'static [StageKind] {
    match family {
        Family::Standard => STANDARD_STAGES,
        Family::Asbestos => ASBESTOS_STAGES,
        Family::MedicalWaste => MEDICAL_WASTE_STAGES,
        Family::EndOfLifeVehicle => END_OF_LIFE_VEHICLE_STAGES,
        Family::HumanRemains => HUMAN_REMAINS_STAGES,
    }
}

/// Whether a family has a stage of this kind at all.
pub fn has_stage(family: Family, kind: StageKind) -> bool {
    stage_kinds(family).contains(&kind)
}

/// The last stage of a family, where acceptance or treatment is decided.
pub fn decision_stage(family: Family) -> Stage {
    match stage_kinds(family).last() {
        Some(kind) => kind.first_stage(),
        None => Stage::Operation,
    }
}

/// The stage at which the destination declares acceptance or refusal.
///
/// This is the reception stage when the family has one, the decision
/// stage otherwise.
pub fn acceptance_stage(family: Family) -> Stage {
    if has_stage(family, StageKind::Reception) {
        Stage::Reception
    } else {
        decision_stage(family)
    }
}

/// Status reached when the decision stage declares a continuation code.
pub fn waiting_status(family: Family) -> Status {
    match family {
        Family::Asbestos | Family::EndOfLifeVehicle => Status::AwaitingChild,
        _ => Status::AwaitingGroup,
    }
}

/// Whether a family supports a document subtype.
pub fn supports_subtype(family: Family, subtype: Subtype) -> bool {
    match subtype {
        Subtype::Simple => true,
        Subtype::Grouping => matches!(
            family,
            Family::Standard | Family::Asbestos | Family::MedicalWaste
        ),
        Subtype::Forwarding => matches!(family, Family::Standard | Family::Asbestos),
        Subtype::Synthesis => family == Family::MedicalWaste,
        Subtype::CollectionPoint => family == Family::Asbestos,
    }
}

/// The concrete stages of a document, with one transport stage per
/// declared transporter (at least one).
pub fn document_stages(doc: &Bordereau) -> Vec<Stage> {
    let transporters = doc.actors.transporters.len().clamp(1, u8::MAX as usize) as u8;
    let mut stages = Vec::new();
    for kind in stage_kinds(doc.family) {
        match kind {
            StageKind::Transport => stages.extend((1..=transporters).map(Stage::Transport)),
            other => stages.push(other.first_stage()),
        }
    }
    stages
}

/// The first stage of the document that is not signed yet.
pub fn next_expected_stage(doc: &Bordereau) -> Option<Stage> {
    if doc.subtype == Subtype::CollectionPoint {
        return (!doc.is_signed(Stage::Operation)).then_some(Stage::Operation);
    }
    document_stages(doc)
        .into_iter()
        .find(|stage| !doc.is_signed(*stage) && !doc.has_signature_after(*stage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{BordereauId, Transporter};
    use chrono::Utc;

    fn make_doc(family: Family, transporters: usize) -> Bordereau {
        let mut doc = Bordereau::new(BordereauId::from("BSD-1"), family, Utc::now());
        doc.actors.transporters = vec![Transporter::default(); transporters];
        doc
    }

    #[test]
    fn test_stage_tables() {
        assert_eq!(stage_kinds(Family::Standard).len(), 4);
        assert!(has_stage(Family::Asbestos, StageKind::Work));
        assert!(!has_stage(Family::Standard, StageKind::Work));
        assert!(!has_stage(Family::EndOfLifeVehicle, StageKind::Reception));
        assert!(has_stage(Family::HumanRemains, StageKind::Reception));
        assert!(has_stage(Family::HumanRemains, StageKind::Operation));
    }

    #[test]
    fn test_decision_stage() {
        assert_eq!(decision_stage(Family::Standard), Stage::Operation);
        assert_eq!(decision_stage(Family::Asbestos), Stage::Operation);
        assert_eq!(decision_stage(Family::HumanRemains), Stage::Operation);
    }

    #[test]
    fn test_acceptance_stage() {
        assert_eq!(acceptance_stage(Family::Standard), Stage::Reception);
        assert_eq!(acceptance_stage(Family::MedicalWaste), Stage::Reception);
        assert_eq!(acceptance_stage(Family::Asbestos), Stage::Operation);
        assert_eq!(acceptance_stage(Family::EndOfLifeVehicle), Stage::Operation);
        assert_eq!(acceptance_stage(Family::HumanRemains), Stage::Reception);
    }

    #[test]
    fn test_waiting_status() {
        assert_eq!(waiting_status(Family::Standard), Status::AwaitingGroup);
        assert_eq!(waiting_status(Family::MedicalWaste), Status::AwaitingGroup);
        assert_eq!(waiting_status(Family::Asbestos), Status::AwaitingChild);
        assert_eq!(waiting_status(Family::EndOfLifeVehicle), Status::AwaitingChild);
    }

    #[test]
    fn test_supports_subtype() {
        assert!(supports_subtype(Family::MedicalWaste, Subtype::Synthesis));
        assert!(!supports_subtype(Family::Standard, Subtype::Synthesis));
        assert!(supports_subtype(Family::Asbestos, Subtype::CollectionPoint));
        assert!(!supports_subtype(Family::EndOfLifeVehicle, Subtype::Grouping));
    }

    #[test]
    fn test_document_stages_expand_transporters() {
        let doc = make_doc(Family::Asbestos, 3);
        assert_eq!(
            document_stages(&doc),
            vec![
                Stage::Emission,
                Stage::Work,
                Stage::Transport(1),
                Stage::Transport(2),
                Stage::Transport(3),
                Stage::Operation,
            ]
        );

        let doc = make_doc(Family::EndOfLifeVehicle, 0);
        assert_eq!(
            document_stages(&doc),
            vec![Stage::Emission, Stage::Transport(1), Stage::Operation]
        );
    }

    #[test]
    fn test_next_expected_stage() {
        let doc = make_doc(Family::Standard, 1);
        assert_eq!(next_expected_stage(&doc), Some(Stage::Emission));

        let mut doc = make_doc(Family::Asbestos, 1).with_subtype(Subtype::CollectionPoint);
        assert_eq!(next_expected_stage(&doc), Some(Stage::Operation));
        doc.signatures.insert(
            Stage::Operation,
            crate::schemas::SignatureRecord {
                author: "D".to_string(),
                date: Utc::now(),
                signatory: "u".into(),
            },
        );
        assert_eq!(next_expected_stage(&doc), None);
    }
}
