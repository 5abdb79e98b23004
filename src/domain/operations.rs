//! Treatment operation catalogue
//!
//! Each family accepts a fixed list of operation codes, classified as
//! final (the waste is definitively treated) or continuation (the waste
//! awaits grouping or forwarding to another installation).

use regex::Regex;

use crate::schemas::{Family, OperationMode};

lazy_static::lazy_static! {
    static ref OPERATION_CODE_REGEX: Regex =
        Regex::new(r"^([A-Z])\s*(\d{1,2})\s*([A-Z]?)$").unwrap();
}

/// Classification of a treatment operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Final,
    Continuation,
}

use OperationKind::{Continuation, Final};

const STANDARD_OPERATIONS: &[(&str, OperationKind)] = &[
    ("R 0", Final),
    ("R 1", Final),
    ("R 2", Final),
    ("R 3", Final),
    ("R 4", Final),
    ("R 5", Final),
    ("R 6", Final),
    ("R 7", Final),
    ("R 8", Final),
    ("R 9", Final),
    ("R 10", Final),
    ("R 11", Final),
    ("R 12", Continuation),
    ("R 13", Continuation),
    ("D 1", Final),
    ("D 2", Final),
    ("D 3", Final),
    ("D 4", Final),
    ("D 5", Final),
    ("D 8", Final),
    ("D 9", Continuation),
    ("D 9 F", Final),
    ("D 10", Final),
    ("D 12", Final),
    ("D 13", Continuation),
    ("D 14", Continuation),
    ("D 15", Continuation),
];

const ASBESTOS_OPERATIONS: &[(&str, OperationKind)] = &[
    ("R 5", Final),
    ("D 5", Final),
    ("D 9", Final),
    ("R 13", Continuation),
    ("D 15", Continuation),
];

const MEDICAL_WASTE_OPERATIONS: &[(&str, OperationKind)] = &[
    ("D 10", Final),
    ("R 1", Final),
    ("D 9 F", Final),
    ("D 13", Continuation),
    ("R 12", Continuation),
];

const END_OF_LIFE_VEHICLE_OPERATIONS: &[(&str, OperationKind)] =
    &[("R 4", Final), ("R 12", Continuation)];

const HUMAN_REMAINS_OPERATIONS: &[(&str, OperationKind)] = &[("R 1", Final), ("D 10", Final)];

/// Legacy medical waste code accepted without an operation mode.
///
/// `D 9` is read as `D 9 F` and the mode is filled with `ELIMINATION`
/// when the signature is applied.
pub const LEGACY_D9_EXEMPTION: (&str, &str) = ("D 9", "D 9 F");

/// Normalize an operation code: `D9` → `D 9`, `d9f` → `D 9 F`.
///
/// Returns None when the input does not look like an operation code.
pub fn normalize_code(raw: &str) -> Option<String> {
    let upper = raw.trim().to_ascii_uppercase();
    let captures = OPERATION_CODE_REGEX.captures(&upper)?;
    let parts: Vec<&str> = (1..=3)
        .filter_map(|i| captures.get(i))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    Some(parts.join(" "))
}

/// The operation catalogue of a family.
pub fn catalogue(family: Family) -> &'static [(&'static str, OperationKind)] {
    match family {
        Family::Standard => STANDARD_OPERATIONS,
        Family::Asbestos => ASBESTOS_OPERATIONS,
        Family::MedicalWaste => MEDICAL_WASTE_OPERATIONS,
        Family::EndOfLifeVehicle => END_OF_LIFE_VEHICLE_OPERATIONS,
        Family::HumanRemains => HUMAN_REMAINS_OPERATIONS,
    }
}

/// An operation code recognized for a family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOperation {
    /// Normalized code, after the legacy exemption is applied
    pub code: String,

    pub kind: OperationKind,

    /// The code was accepted through the legacy D9 exemption
    pub legacy_d9: bool,
}

/// Resolve a raw operation code against a family catalogue.
///
/// Returns None for codes the family does not recognize.
pub fn resolve_operation(family: Family, raw: &str) -> Option<ResolvedOperation> {
    let normalized = normalize_code(raw)?;
    let (code, legacy_d9) =
        if family == Family::MedicalWaste && normalized == LEGACY_D9_EXEMPTION.0 {
            (LEGACY_D9_EXEMPTION.1.to_string(), true)
        } else {
            (normalized, false)
        };

    catalogue(family)
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, kind)| ResolvedOperation {
            code,
            kind: *kind,
            legacy_d9,
        })
}

/// Classify a raw operation code for a family.
pub fn classify(family: Family, raw: &str) -> Option<OperationKind> {
    resolve_operation(family, raw).map(|op| op.kind)
}

/// Treatment modes expected for a normalized operation code.
///
/// An empty slice means the code takes no mode.
pub fn expected_modes(code: &str) -> &'static [OperationMode] {
    use OperationMode::*;

    match code {
        "D 1" | "D 2" | "D 3" | "D 4" | "D 5" | "D 7" | "D 8" | "D 9 F" | "D 10" | "D 11"
        | "D 12" => &[Elimination],
        "R 0" => &[Reutilisation],
        "R 1" => &[ValorisationEnergetique],
        "R 2" => &[Reutilisation, Recyclage],
        "R 3" => &[Recyclage, AutresValorisations],
        "R 4" => &[Recyclage],
        "R 5" => &[Recyclage, AutresValorisations],
        "R 6" => &[Recyclage, Reutilisation],
        "R 7" => &[Reutilisation],
        "R 8" => &[Recyclage, Reutilisation],
        "R 9" => &[Reutilisation, Recyclage, ValorisationEnergetique],
        "R 10" => &[Recyclage],
        "R 11" => &[Recyclage, AutresValorisations, ValorisationEnergetique],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("D9").as_deref(), Some("D 9"));
        assert_eq!(normalize_code("d9f").as_deref(), Some("D 9 F"));
        assert_eq!(normalize_code("D 9 F").as_deref(), Some("D 9 F"));
        assert_eq!(normalize_code(" R 13 ").as_deref(), Some("R 13"));
        assert_eq!(normalize_code("R1").as_deref(), Some("R 1"));
        assert_eq!(normalize_code("incineration"), None);
        assert_eq!(normalize_code("D 123"), None);
    }

    #[test]
    fn test_classify_standard() {
        assert_eq!(classify(Family::Standard, "R1"), Some(Final));
        assert_eq!(classify(Family::Standard, "D 13"), Some(Continuation));
        assert_eq!(classify(Family::Standard, "D9"), Some(Continuation));
        assert_eq!(classify(Family::Standard, "D9F"), Some(Final));
        assert_eq!(classify(Family::Standard, "D 6"), None);
    }

    #[test]
    fn test_classify_per_family() {
        assert_eq!(classify(Family::Asbestos, "D9"), Some(Final));
        assert_eq!(classify(Family::Asbestos, "R 13"), Some(Continuation));
        assert_eq!(classify(Family::Asbestos, "R 1"), None);
        assert_eq!(classify(Family::EndOfLifeVehicle, "R 4"), Some(Final));
        assert_eq!(classify(Family::EndOfLifeVehicle, "R 12"), Some(Continuation));
        assert_eq!(classify(Family::HumanRemains, "D 10"), Some(Final));
        assert_eq!(classify(Family::HumanRemains, "D 13"), None);
    }

    #[test]
    fn test_legacy_d9_exemption_only_for_medical_waste() {
        let op = resolve_operation(Family::MedicalWaste, "D9").unwrap();
        assert_eq!(op.code, "D 9 F");
        assert_eq!(op.kind, Final);
        assert!(op.legacy_d9);

        let op = resolve_operation(Family::MedicalWaste, "D 9 F").unwrap();
        assert!(!op.legacy_d9);

        let op = resolve_operation(Family::Standard, "D9").unwrap();
        assert_eq!(op.code, "D 9");
        assert!(!op.legacy_d9);
    }

    #[test]
    fn test_expected_modes() {
        assert_eq!(expected_modes("D 9 F"), &[OperationMode::Elimination]);
        assert!(expected_modes("D 9").is_empty());
        assert!(expected_modes("D 13").is_empty());
        assert_eq!(expected_modes("R 2").len(), 2);
        assert!(expected_modes("R 1").contains(&OperationMode::ValorisationEnergetique));
    }
}
