//! Schema types for bordereaux
//!
//! Serde data model shared by the engine, the stores and the CLI.

mod actors;
mod bordereau;
mod config;
mod directory;
mod payload;

pub use actors::{Actors, CompanyInfo, Producer, TransportMode, TransportReceipt, Transporter};
pub use bordereau::{
    Bordereau, BordereauId, ChainLinks, Family, LinkKind, OrgId, SignatureRecord, Stage,
    StageKind, Status, Subtype, UserId,
};
pub use config::EngineConfig;
pub use directory::{CompanyRecord, DirectorySnapshot, UserRecord};
pub use payload::{
    Acceptation, DestinationDetails, OperationDetails, OperationMode, Packaging, PackagingMode,
    Payload, ReceptionDetails, Waste, Weight, WorkerDetails,
};
