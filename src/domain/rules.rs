//! Required-field tables per family
//!
//! Each rule names a field, the lifecycle milestone from which it must be
//! filled, and an optional condition. The validator evaluates every rule
//! whose milestone is at or before the stage being signed.

use crate::schemas::{
    Acceptation, Bordereau, Family, PackagingMode, Stage, StageKind, Transporter, TransportMode,
};

use super::stages::{acceptance_stage, decision_stage};

/// Point of the lifecycle from which a field is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Emission,
    Work,
    Transport,
    /// Reception when the family has one, the decision stage otherwise
    Acceptance,
    /// Last stage of the family
    Decision,
}

impl Milestone {
    /// The concrete stage of a family corresponding to this milestone.
    pub fn stage(&self, family: Family) -> Stage {
        match self {
            Milestone::Emission => StageKind::Emission.first_stage(),
            Milestone::Work => StageKind::Work.first_stage(),
            Milestone::Transport => StageKind::Transport.first_stage(),
            Milestone::Acceptance => acceptance_stage(family),
            Milestone::Decision => decision_stage(family),
        }
    }
}

/// A document-level required field
pub struct FieldRule {
    pub path: &'static str,
    pub label: &'static str,
    pub required_from: Milestone,
    /// The rule only applies when this returns true
    pub when: Option<fn(&Bordereau) -> bool>,
    pub present: fn(&Bordereau) -> bool,
}

impl FieldRule {
    pub fn applies_to(&self, doc: &Bordereau) -> bool {
        self.when.map_or(true, |when| when(doc))
    }
}

/// A required field of each transporter, checked from that transporter's
/// own transport stage.
pub struct TransporterRule {
    pub field: &'static str,
    pub label: &'static str,
    pub when: Option<fn(&Transporter) -> bool>,
    pub present: fn(&Transporter) -> bool,
}

impl TransporterRule {
    pub fn applies_to(&self, transporter: &Transporter) -> bool {
        self.when.map_or(true, |when| when(transporter))
    }
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

fn is_company(doc: &Bordereau) -> bool {
    !doc.actors.producer.is_private_individual
}

fn not_refused(doc: &Bordereau) -> bool {
    !doc.payload.destination.is_totally_refused()
}

fn has_refusal(doc: &Bordereau) -> bool {
    doc.payload
        .destination
        .acceptation()
        .map_or(false, |a| a.is_refusal())
}

/// The worker is declared and not flagged disabled
pub fn has_active_worker(doc: &Bordereau) -> bool {
    doc.actors.worker.is_some() && !doc.payload.worker.is_disabled
}

/// Rules shared by every family
pub static COMMON_RULES: &[FieldRule] = &[
    FieldRule {
        path: "producer.company.name",
        label: "producer name",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.actors.producer.company.name),
    },
    FieldRule {
        path: "producer.company.org_id",
        label: "producer organization number",
        required_from: Milestone::Emission,
        when: Some(is_company),
        present: |doc| doc.actors.producer.company.org_id.is_some(),
    },
    FieldRule {
        path: "producer.company.address",
        label: "producer address",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.actors.producer.company.address),
    },
    FieldRule {
        path: "producer.company.contact",
        label: "producer contact",
        required_from: Milestone::Emission,
        when: Some(is_company),
        present: |doc| filled(&doc.actors.producer.company.contact),
    },
    FieldRule {
        path: "producer.company.phone",
        label: "producer phone number",
        required_from: Milestone::Emission,
        when: Some(is_company),
        present: |doc| filled(&doc.actors.producer.company.phone),
    },
    FieldRule {
        path: "waste.code",
        label: "waste code",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.payload.waste.code),
    },
    FieldRule {
        path: "destination.company.org_id",
        label: "destination organization number",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| doc.actors.destination_org().is_some(),
    },
    FieldRule {
        path: "destination.company.name",
        label: "destination name",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| doc.actors.destination.as_ref().map_or(false, |d| filled(&d.name)),
    },
    FieldRule {
        path: "destination.company.address",
        label: "destination address",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| {
            doc.actors
                .destination
                .as_ref()
                .map_or(false, |d| filled(&d.address))
        },
    },
    FieldRule {
        path: "destination.reception.date",
        label: "reception date",
        required_from: Milestone::Acceptance,
        when: None,
        present: |doc| doc.payload.destination.reception.date.is_some(),
    },
    FieldRule {
        path: "destination.reception.acceptation",
        label: "acceptance status",
        required_from: Milestone::Acceptance,
        when: None,
        present: |doc| doc.payload.destination.reception.acceptation.is_some(),
    },
    FieldRule {
        path: "destination.reception.weight",
        label: "received weight",
        required_from: Milestone::Acceptance,
        when: Some(not_refused),
        present: |doc| doc.payload.destination.reception.weight.is_some(),
    },
    FieldRule {
        path: "destination.reception.refusal_reason",
        label: "refusal reason",
        required_from: Milestone::Acceptance,
        when: Some(has_refusal),
        present: |doc| filled(&doc.payload.destination.reception.refusal_reason),
    },
    FieldRule {
        path: "destination.reception.refused_weight",
        label: "refused weight",
        required_from: Milestone::Acceptance,
        when: Some(|doc| {
            doc.payload.destination.acceptation() == Some(Acceptation::PartiallyRefused)
        }),
        present: |doc| doc.payload.destination.reception.refused_weight.is_some(),
    },
    FieldRule {
        path: "destination.operation.code",
        label: "treatment operation code",
        required_from: Milestone::Decision,
        when: Some(not_refused),
        present: |doc| filled(&doc.payload.destination.operation.code),
    },
    FieldRule {
        path: "destination.operation.date",
        label: "treatment date",
        required_from: Milestone::Decision,
        when: Some(not_refused),
        present: |doc| doc.payload.destination.operation.date.is_some(),
    },
];

pub static STANDARD_RULES: &[FieldRule] = &[
    FieldRule {
        path: "waste.description",
        label: "waste description",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.payload.waste.description),
    },
    FieldRule {
        path: "waste.weight",
        label: "waste weight",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| doc.payload.waste.weight.is_some(),
    },
    FieldRule {
        path: "waste.packagings",
        label: "packagings",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| !doc.payload.waste.packagings.is_empty(),
    },
];

pub static ASBESTOS_RULES: &[FieldRule] = &[
    FieldRule {
        path: "waste.consistence",
        label: "waste consistence",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.payload.waste.consistence),
    },
    FieldRule {
        path: "waste.weight",
        label: "waste weight",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| doc.payload.waste.weight.is_some(),
    },
    FieldRule {
        path: "destination.cap",
        label: "destination CAP",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.payload.destination.cap),
    },
    FieldRule {
        path: "worker.company.org_id",
        label: "worker organization number",
        required_from: Milestone::Emission,
        when: Some(has_active_worker),
        present: |doc| doc.actors.worker_org().is_some(),
    },
    FieldRule {
        path: "worker.company.name",
        label: "worker name",
        required_from: Milestone::Emission,
        when: Some(has_active_worker),
        present: |doc| doc.actors.worker.as_ref().map_or(false, |w| filled(&w.name)),
    },
    FieldRule {
        path: "worker.certification_number",
        label: "worker certification number",
        required_from: Milestone::Work,
        when: Some(|doc| has_active_worker(doc) && doc.payload.worker.has_sub_section_three),
        present: |doc| filled(&doc.payload.worker.certification_number),
    },
    FieldRule {
        path: "waste.seal_numbers",
        label: "seal numbers",
        required_from: Milestone::Transport,
        when: None,
        present: |doc| !doc.payload.waste.seal_numbers.is_empty(),
    },
];

pub static MEDICAL_WASTE_RULES: &[FieldRule] = &[
    FieldRule {
        path: "waste.adr",
        label: "ADR mention",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.payload.waste.adr),
    },
    FieldRule {
        path: "waste.packagings",
        label: "packagings",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| !doc.payload.waste.packagings.is_empty(),
    },
    FieldRule {
        path: "waste.weight",
        label: "waste weight",
        required_from: Milestone::Transport,
        when: None,
        present: |doc| doc.payload.waste.weight.is_some(),
    },
];

pub static END_OF_LIFE_VEHICLE_RULES: &[FieldRule] = &[
    FieldRule {
        path: "waste.packaging_mode",
        label: "packaging mode",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| doc.payload.waste.packaging_mode.is_some(),
    },
    FieldRule {
        path: "waste.identification_numbers",
        label: "identification numbers",
        required_from: Milestone::Emission,
        when: Some(|doc| doc.payload.waste.packaging_mode == Some(PackagingMode::Unit)),
        present: |doc| !doc.payload.waste.identification_numbers.is_empty(),
    },
    FieldRule {
        path: "waste.weight",
        label: "waste weight",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| doc.payload.waste.weight.is_some(),
    },
];

pub static HUMAN_REMAINS_RULES: &[FieldRule] = &[
    FieldRule {
        path: "waste.description",
        label: "waste description",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| filled(&doc.payload.waste.description),
    },
    FieldRule {
        path: "waste.packagings",
        label: "packagings",
        required_from: Milestone::Emission,
        when: None,
        present: |doc| !doc.payload.waste.packagings.is_empty(),
    },
];

/// Rules checked on every transporter
pub static TRANSPORTER_RULES: &[TransporterRule] = &[
    TransporterRule {
        field: "company.org_id",
        label: "transporter organization number",
        when: None,
        present: |t| t.company.org_id.is_some(),
    },
    TransporterRule {
        field: "company.name",
        label: "transporter name",
        when: None,
        present: |t| filled(&t.company.name),
    },
    TransporterRule {
        field: "company.address",
        label: "transporter address",
        when: None,
        present: |t| filled(&t.company.address),
    },
    TransporterRule {
        field: "receipt.number",
        label: "transport receipt number",
        when: Some(|t| !t.is_exempted_of_receipt),
        present: |t| t.receipt.as_ref().map_or(false, |r| filled(&r.number)),
    },
    TransporterRule {
        field: "receipt.department",
        label: "transport receipt department",
        when: Some(|t| !t.is_exempted_of_receipt),
        present: |t| t.receipt.as_ref().map_or(false, |r| filled(&r.department)),
    },
    TransporterRule {
        field: "receipt.validity_limit",
        label: "transport receipt validity limit",
        when: Some(|t| !t.is_exempted_of_receipt),
        present: |t| {
            t.receipt
                .as_ref()
                .map_or(false, |r| r.validity_limit.is_some())
        },
    },
    TransporterRule {
        field: "plates",
        label: "license plates",
        when: Some(|t| t.mode == TransportMode::Road),
        present: |t| t.plates.iter().any(|p| !p.trim().is_empty()),
    },
];

/// The document-level rule table of a family (common rules excluded).
pub fn family_rules(family: Family) -> &'static [FieldRule] {
    match family {
        Family::Standard => STANDARD_RULES,
        Family::Asbestos => ASBESTOS_RULES,
        Family::MedicalWaste => MEDICAL_WASTE_RULES,
        Family::EndOfLifeVehicle => END_OF_LIFE_VEHICLE_RULES,
        Family::HumanRemains => HUMAN_REMAINS_RULES,
    }
}

/// Every document-level rule of a family, common rules first.
pub fn rules_for(family: Family) -> impl Iterator<Item = &'static FieldRule> {
    COMMON_RULES.iter().chain(family_rules(family).iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_stages() {
        assert_eq!(Milestone::Transport.stage(Family::Standard), Stage::Transport(1));
        assert_eq!(Milestone::Acceptance.stage(Family::Standard), Stage::Reception);
        assert_eq!(Milestone::Acceptance.stage(Family::Asbestos), Stage::Operation);
        assert_eq!(Milestone::Acceptance.stage(Family::HumanRemains), Stage::Reception);
        assert_eq!(Milestone::Decision.stage(Family::HumanRemains), Stage::Operation);
    }

    #[test]
    fn test_rule_paths_are_unique_per_family() {
        for family in [
            Family::Standard,
            Family::Asbestos,
            Family::MedicalWaste,
            Family::EndOfLifeVehicle,
            Family::HumanRemains,
        ] {
            let mut paths: Vec<&str> = rules_for(family).map(|r| r.path).collect();
            let total = paths.len();
            paths.sort();
            paths.dedup();
            assert_eq!(paths.len(), total, "duplicate rule path for {}", family);
        }
    }

    #[test]
    fn test_work_rules_only_for_asbestos() {
        for family in [Family::Standard, Family::MedicalWaste, Family::HumanRemains] {
            assert!(rules_for(family).all(|r| r.required_from != Milestone::Work));
        }
        assert!(rules_for(Family::Asbestos).any(|r| r.required_from == Milestone::Work));
    }
}
