//! Field completeness validator
//!
//! Evaluates every rule required up to and including the target stage and
//! returns all issues found, never just the first.

use crate::errors::{BsdError, Result, ValidationIssue};
use crate::schemas::{
    Acceptation, Bordereau, EngineConfig, PackagingMode, Stage, StageKind, Subtype,
};

use super::operations::{expected_modes, normalize_code, resolve_operation, OperationKind};
use super::rules::{rules_for, Milestone, TRANSPORTER_RULES};
use super::stages::decision_stage;

/// Context required for validating a document
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub config: EngineConfig,
}

impl ValidationContext {
    pub fn new(config: EngineConfig) -> Self {
        ValidationContext { config }
    }
}

/// Result of a completeness check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    fn missing(&mut self, path: impl Into<String>, label: &str) {
        self.issues
            .push(ValidationIssue::new(path, format!("the {} is required", label)));
    }

    fn invalid(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, message));
    }

    /// Convert into an error carrying every issue
    pub fn into_result(self) -> Result<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(BsdError::ValidationFailed {
                issues: self.issues,
            })
        }
    }
}

/// Validate that a document holds every field required to close `target`.
pub fn validate_for_stage(
    doc: &Bordereau,
    target: Stage,
    ctx: &ValidationContext,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    for rule in rules_for(doc.family) {
        if target < rule.required_from.stage(doc.family) || !rule.applies_to(doc) {
            continue;
        }
        if !(rule.present)(doc) {
            result.missing(rule.path, rule.label);
        }
    }

    check_transporters(doc, target, ctx, &mut result);
    check_packaging(doc, &mut result);

    if target >= Milestone::Acceptance.stage(doc.family) {
        check_acceptance(doc, &mut result);
    }
    if target >= decision_stage(doc.family) && !doc.payload.destination.is_totally_refused() {
        check_operation(doc, &mut result);
    }

    result
}

fn check_transporters(
    doc: &Bordereau,
    target: Stage,
    ctx: &ValidationContext,
    result: &mut ValidationResult,
) {
    let transporters = &doc.actors.transporters;
    if transporters.len() > ctx.config.max_transporters {
        result.invalid(
            "transporters",
            format!(
                "a document cannot carry more than {} transporters",
                ctx.config.max_transporters
            ),
        );
    }

    let past_transport = target.kind() > StageKind::Transport;
    for (index, transporter) in transporters.iter().enumerate() {
        let number = match u8::try_from(index + 1) {
            Ok(n) => n,
            Err(_) => break,
        };
        let stage = Stage::Transport(number);
        if target < stage {
            continue;
        }
        // Legs that never started are dropped once the waste has arrived.
        if past_transport && number > 1 && !doc.is_signed(stage) {
            continue;
        }
        for rule in TRANSPORTER_RULES {
            if rule.applies_to(transporter) && !(rule.present)(transporter) {
                result.missing(format!("transporters[{}].{}", number, rule.field), rule.label);
            }
        }
    }
}

fn check_packaging(doc: &Bordereau, result: &mut ValidationResult) {
    let waste = &doc.payload.waste;
    if waste.packaging_mode == Some(PackagingMode::Lot) && !waste.identification_numbers.is_empty()
    {
        result.invalid(
            "waste.identification_numbers",
            "identification numbers are not allowed when the packaging mode is LOT",
        );
    }
}

fn check_acceptance(doc: &Bordereau, result: &mut ValidationResult) {
    if doc.subtype == Subtype::Synthesis {
        if let Some(acceptation) = doc.payload.destination.acceptation() {
            if acceptation != Acceptation::Accepted {
                result.invalid(
                    "destination.reception.acceptation",
                    "a synthesis document cannot be refused, even partially",
                );
            }
        }
    }
}

fn check_operation(doc: &Bordereau, result: &mut ValidationResult) {
    let operation = &doc.payload.destination.operation;
    let raw = match operation.code.as_deref() {
        Some(code) if !code.trim().is_empty() => code,
        _ => return,
    };

    let resolved = match resolve_operation(doc.family, raw) {
        Some(resolved) => resolved,
        None => {
            let shown = normalize_code(raw).unwrap_or_else(|| raw.to_string());
            result.invalid(
                "destination.operation.code",
                format!(
                    "{} is not a recognized treatment operation for {} documents",
                    shown, doc.family
                ),
            );
            return;
        }
    };

    if doc.subtype == Subtype::Synthesis && resolved.kind == OperationKind::Continuation {
        result.invalid(
            "destination.operation.code",
            format!(
                "a synthesis document requires a final treatment operation, not {}",
                resolved.code
            ),
        );
    }

    if !resolved.legacy_d9 {
        let modes = expected_modes(&resolved.code);
        match operation.mode {
            None if !modes.is_empty() => result.invalid(
                "destination.operation.mode",
                format!("an operation mode is required for code {}", resolved.code),
            ),
            Some(mode) if modes.is_empty() => result.invalid(
                "destination.operation.mode",
                format!("code {} does not take an operation mode, got {}", resolved.code, mode),
            ),
            Some(mode) if !modes.contains(&mode) => result.invalid(
                "destination.operation.mode",
                format!("mode {} is not compatible with code {}", mode, resolved.code),
            ),
            _ => {}
        }
    }

    if resolved.kind == OperationKind::Final && operation.treated_weight.is_none() {
        result.missing("destination.operation.treated_weight", "treated weight");
    }
}
