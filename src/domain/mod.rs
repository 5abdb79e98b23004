//! Domain logic for the signature lifecycle: stages, statuses, rules and cascades

pub mod authorization;
pub mod cascade;
pub mod operations;
pub mod rules;
pub mod stages;
mod status;
mod transitions;
mod validation;

// Property-based tests (compiled only in test builds)
#[cfg(test)]
mod property_tests;

pub use authorization::{authorize_signer, expected_role, expected_signers, SignerAuthorization};
pub use cascade::{detach, propagate, CascadeChange, CascadeContext};
pub use operations::{
    classify, expected_modes, normalize_code, resolve_operation, OperationKind, ResolvedOperation,
    LEGACY_D9_EXEMPTION,
};
pub use rules::{rules_for, FieldRule, Milestone, TransporterRule};
pub use stages::{
    acceptance_stage, decision_stage, document_stages, has_stage, next_expected_stage,
    stage_kinds, supports_subtype, waiting_status,
};
pub use status::derive_status;
pub use transitions::{
    apply_signature, check_sequencing, resolve_stage, Sequencing, SequencingContext,
    SignatureInput, SYNTHESIS_EMISSION_MESSAGE,
};
pub use validation::{validate_for_stage, ValidationContext, ValidationResult};
