//! Payload schemas - family-specific waste, worker and destination data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quantity in tonnes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,

    /// Estimated rather than weighed
    #[serde(default)]
    pub is_estimate: bool,
}

impl Weight {
    pub fn real(value: f64) -> Self {
        Weight {
            value,
            is_estimate: false,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.value > 0.0
    }
}

/// How the waste items are conditioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackagingMode {
    /// Individually identified units; identification numbers required
    Unit,
    /// Bulk lot; identification numbers are not allowed
    Lot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packaging {
    pub kind: String,
    pub quantity: u32,
}

/// Description of the shipped waste
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waste {
    /// Regulatory waste code (e.g. "17 06 05*")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Dangerous goods transport mention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistence: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seal_numbers: Vec<String>,

    /// Persistent organic pollutants present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packagings: Vec<Packaging>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging_mode: Option<PackagingMode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identification_numbers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

/// Worker-specific flags and certification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerDetails {
    /// The worker role is not used on this document
    #[serde(default)]
    pub is_disabled: bool,

    /// The worker holds the producer's paper signature
    #[serde(default)]
    pub has_emitter_paper_signature: bool,

    /// Removal works (sub-section 3) require a certification
    #[serde(default)]
    pub has_sub_section_three: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_validity_limit: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_description: Option<String>,
}

/// Acceptance declared by the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Acceptation {
    Accepted,
    Refused,
    PartiallyRefused,
}

impl Acceptation {
    pub fn is_refusal(&self) -> bool {
        matches!(self, Acceptation::Refused | Acceptation::PartiallyRefused)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceptionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptation: Option<Acceptation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refused_weight: Option<Weight>,
}

/// Treatment mode refining an operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationMode {
    Reutilisation,
    Recyclage,
    ValorisationEnergetique,
    AutresValorisations,
    Elimination,
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationMode::Reutilisation => write!(f, "REUTILISATION"),
            OperationMode::Recyclage => write!(f, "RECYCLAGE"),
            OperationMode::ValorisationEnergetique => write!(f, "VALORISATION_ENERGETIQUE"),
            OperationMode::AutresValorisations => write!(f, "AUTRES_VALORISATIONS"),
            OperationMode::Elimination => write!(f, "ELIMINATION"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDetails {
    /// Treatment operation code (e.g. "R 1", "D 13")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<OperationMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Quantity actually treated; required for final operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treated_weight: Option<Weight>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Data filled by the destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationDetails {
    /// Certificat d'acceptation préalable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_operation_code: Option<String>,

    #[serde(default)]
    pub reception: ReceptionDetails,

    #[serde(default)]
    pub operation: OperationDetails,
}

impl DestinationDetails {
    pub fn acceptation(&self) -> Option<Acceptation> {
        self.reception.acceptation
    }

    pub fn is_totally_refused(&self) -> bool {
        self.reception.acceptation == Some(Acceptation::Refused)
    }
}

/// Family-specific structured data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub waste: Waste,

    #[serde(default)]
    pub worker: WorkerDetails,

    #[serde(default)]
    pub destination: DestinationDetails,
}
