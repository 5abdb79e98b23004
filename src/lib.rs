//! Bordereaux - Signature and status lifecycle engine for waste-shipment documents
//!
//! This library provides the core functionality for the bsd CLI, including:
//! - Schema definitions for bordereaux, actors, payloads and the engine config
//! - Domain logic for stage sequencing, validation, authorization and status derivation
//! - Cascading of outcomes across grouped, forwarded and synthesized documents
//! - Transactional stores (in-memory and JSON file backed)
//! - The signature engine that ties them together

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod identity;
pub mod schemas;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use engine::{SignRequest, SignatureEngine};
pub use errors::{BsdError, Result};
pub use identity::{Directory, InMemoryDirectory};
pub use schemas::{Bordereau, BordereauId, EngineConfig, Family, Stage, StageKind, Status};
pub use store::{BordereauStore, JsonFileStore, MemoryStore};
