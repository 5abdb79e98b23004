//! Bordereau schema - the aggregate root of the lifecycle engine

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{BsdError, Result};

use super::actors::Actors;
use super::payload::Payload;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }
    };
}

string_id!(
    /// Stable opaque identifier of a bordereau, never reused
    BordereauId
);
string_id!(
    /// Identifier of an organization (company registration number)
    OrgId
);
string_id!(
    /// Identifier of an authenticated user
    UserId
);

/// Document family; fixes stage names, rule tables and actor roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Family {
    Standard,
    Asbestos,
    MedicalWaste,
    EndOfLifeVehicle,
    HumanRemains,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Standard => write!(f, "STANDARD"),
            Family::Asbestos => write!(f, "ASBESTOS"),
            Family::MedicalWaste => write!(f, "MEDICAL_WASTE"),
            Family::EndOfLifeVehicle => write!(f, "END_OF_LIFE_VEHICLE"),
            Family::HumanRemains => write!(f, "HUMAN_REMAINS"),
        }
    }
}

impl std::str::FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(Family::Standard),
            "ASBESTOS" => Ok(Family::Asbestos),
            "MEDICAL_WASTE" => Ok(Family::MedicalWaste),
            "END_OF_LIFE_VEHICLE" => Ok(Family::EndOfLifeVehicle),
            "HUMAN_REMAINS" => Ok(Family::HumanRemains),
            _ => Err(format!("Unknown family: {}", s)),
        }
    }
}

/// Structural subtype of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subtype {
    #[default]
    Simple,
    /// Consolidates several documents' waste
    Grouping,
    /// Re-ships a prior document's waste onward
    Forwarding,
    /// Authoritative transport record for several documents
    Synthesis,
    /// Reception-only document at a collection point
    CollectionPoint,
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subtype::Simple => write!(f, "SIMPLE"),
            Subtype::Grouping => write!(f, "GROUPING"),
            Subtype::Forwarding => write!(f, "FORWARDING"),
            Subtype::Synthesis => write!(f, "SYNTHESIS"),
            Subtype::CollectionPoint => write!(f, "COLLECTION_POINT"),
        }
    }
}

/// Lifecycle status, always derived from signatures and branch flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Draft,
    Initial,
    SignedByProducer,
    SignedByWorker,
    Sent,
    Received,
    Processed,
    Refused,
    AwaitingChild,
    AwaitingGroup,
}

impl Status {
    /// Statuses from which no further signature is expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Processed | Status::Refused)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Draft => "DRAFT",
            Status::Initial => "INITIAL",
            Status::SignedByProducer => "SIGNED_BY_PRODUCER",
            Status::SignedByWorker => "SIGNED_BY_WORKER",
            Status::Sent => "SENT",
            Status::Received => "RECEIVED",
            Status::Processed => "PROCESSED",
            Status::Refused => "REFUSED",
            Status::AwaitingChild => "AWAITING_CHILD",
            Status::AwaitingGroup => "AWAITING_GROUP",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Status::Draft),
            "INITIAL" => Ok(Status::Initial),
            "SIGNED_BY_PRODUCER" => Ok(Status::SignedByProducer),
            "SIGNED_BY_WORKER" => Ok(Status::SignedByWorker),
            "SENT" => Ok(Status::Sent),
            "RECEIVED" => Ok(Status::Received),
            "PROCESSED" => Ok(Status::Processed),
            "REFUSED" => Ok(Status::Refused),
            "AWAITING_CHILD" => Ok(Status::AwaitingChild),
            "AWAITING_GROUP" => Ok(Status::AwaitingGroup),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Signature type declared by a request, before transporter resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageKind {
    Emission,
    Work,
    Transport,
    Reception,
    Operation,
}

impl StageKind {
    /// The first concrete stage of this kind
    pub fn first_stage(&self) -> Stage {
        match self {
            StageKind::Emission => Stage::Emission,
            StageKind::Work => Stage::Work,
            StageKind::Transport => Stage::Transport(1),
            StageKind::Reception => Stage::Reception,
            StageKind::Operation => Stage::Operation,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Emission => write!(f, "EMISSION"),
            StageKind::Work => write!(f, "WORK"),
            StageKind::Transport => write!(f, "TRANSPORT"),
            StageKind::Reception => write!(f, "RECEPTION"),
            StageKind::Operation => write!(f, "OPERATION"),
        }
    }
}

impl std::str::FromStr for StageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EMISSION" => Ok(StageKind::Emission),
            "WORK" => Ok(StageKind::Work),
            "TRANSPORT" => Ok(StageKind::Transport),
            "RECEPTION" => Ok(StageKind::Reception),
            "OPERATION" => Ok(StageKind::Operation),
            _ => Err(format!("Unknown signature type: {}", s)),
        }
    }
}

/// A concrete signature checkpoint.
///
/// Variant order is the lifecycle order; transports are numbered from 1
/// by transporter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Emission,
    Work,
    Transport(u8),
    Reception,
    Operation,
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Emission => StageKind::Emission,
            Stage::Work => StageKind::Work,
            Stage::Transport(_) => StageKind::Transport,
            Stage::Reception => StageKind::Reception,
            Stage::Operation => StageKind::Operation,
        }
    }

    /// Position of the transporter for transport stages
    pub fn transporter_number(&self) -> Option<u8> {
        match self {
            Stage::Transport(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transport(n) => write!(f, "TRANSPORT_{}", n),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if let Some(n) = upper.strip_prefix("TRANSPORT_") {
            return match n.parse::<u8>() {
                Ok(n) if n >= 1 => Ok(Stage::Transport(n)),
                _ => Err(format!("Unknown stage: {}", s)),
            };
        }
        match upper.parse::<StageKind>() {
            Ok(kind) => Ok(kind.first_stage()),
            Err(_) => Err(format!("Unknown stage: {}", s)),
        }
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StageVisitor;

        impl<'de> Visitor<'de> for StageVisitor {
            type Value = Stage;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a stage name such as EMISSION or TRANSPORT_2")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Stage, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(StageVisitor)
    }
}

/// An irrevocable signature on one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Display name of the person who signed
    pub author: String,

    /// When the signature was placed
    pub date: DateTime<Utc>,

    /// Authenticated identity that placed the signature
    pub signatory: UserId,
}

/// Which chain link a query follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    ForwardingOf,
    GroupedInto,
    SynthesizedBy,
}

/// Optional references to other documents in a chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainLinks {
    /// This document re-ships the referenced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarding_of: Option<BordereauId>,

    /// This document's waste is consolidated into the referenced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped_into: Option<BordereauId>,

    /// This document's transport is executed under the referenced synthesis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesized_by: Option<BordereauId>,
}

impl ChainLinks {
    pub fn get(&self, kind: LinkKind) -> Option<&BordereauId> {
        match kind {
            LinkKind::ForwardingOf => self.forwarding_of.as_ref(),
            LinkKind::GroupedInto => self.grouped_into.as_ref(),
            LinkKind::SynthesizedBy => self.synthesized_by.as_ref(),
        }
    }
}

/// A regulated waste-shipment document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bordereau {
    pub id: BordereauId,

    pub family: Family,

    #[serde(default)]
    pub subtype: Subtype,

    pub status: Status,

    #[serde(default)]
    pub is_draft: bool,

    /// Soft-delete flag; deleted documents are invisible to the engine
    #[serde(default)]
    pub is_deleted: bool,

    /// Stage name to signature; a present record closes the stage
    #[serde(default)]
    pub signatures: BTreeMap<Stage, SignatureRecord>,

    #[serde(default)]
    pub actors: Actors,

    #[serde(default)]
    pub payload: Payload,

    #[serde(default)]
    pub links: ChainLinks,

    /// Set when a downstream document of the chain reached final treatment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_downstream_by: Option<BordereauId>,

    /// Emission was signed by another party using the producer's secret code
    #[serde(default)]
    pub is_emission_taken_over_with_secret_code: bool,

    /// Transport started without any producer signature
    #[serde(default)]
    pub is_direct_takeover: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Bordereau {
    /// Create a new draft document with empty actors and payload
    pub fn new(id: BordereauId, family: Family, now: DateTime<Utc>) -> Self {
        Bordereau {
            id,
            family,
            subtype: Subtype::Simple,
            status: Status::Draft,
            is_draft: true,
            is_deleted: false,
            signatures: BTreeMap::new(),
            actors: Actors::default(),
            payload: Payload::default(),
            links: ChainLinks::default(),
            processed_downstream_by: None,
            is_emission_taken_over_with_secret_code: false,
            is_direct_takeover: false,
            created_at: now,
            updated_at: now,
        }
    }

    // ===== BUILDER METHODS =====

    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtype = subtype;
        self
    }

    pub fn with_actors(mut self, actors: Actors) -> Self {
        self.actors = actors;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_links(mut self, links: ChainLinks) -> Self {
        self.links = links;
        self
    }

    // ===== ACCESSORS =====

    pub fn is_signed(&self, stage: Stage) -> bool {
        self.signatures.contains_key(&stage)
    }

    pub fn signature(&self, stage: Stage) -> Option<&SignatureRecord> {
        self.signatures.get(&stage)
    }

    /// The latest signed stage, if any
    pub fn current_stage(&self) -> Option<Stage> {
        self.signatures.keys().next_back().copied()
    }

    pub fn any_transport_signed(&self) -> bool {
        self.signatures.keys().any(|s| s.kind() == StageKind::Transport)
    }

    /// Number of the first transporter who has not signed yet
    pub fn next_unsigned_transporter(&self) -> Option<u8> {
        (1..=self.actors.transporters.len())
            .filter_map(|n| u8::try_from(n).ok())
            .find(|n| !self.is_signed(Stage::Transport(*n)))
    }

    /// Whether a stage later than `stage` already carries a signature
    pub fn has_signature_after(&self, stage: Stage) -> bool {
        self.signatures.keys().any(|s| *s > stage)
    }

    /// Write a signature record; a stage can only be written once.
    pub fn record_signature(&mut self, stage: Stage, record: SignatureRecord) -> Result<()> {
        if self.is_signed(stage) {
            return Err(BsdError::AlreadySigned(format!(
                "stage {} of bordereau {} is already signed",
                stage, self.id
            )));
        }
        self.signatures.insert(stage, record);
        Ok(())
    }
}
