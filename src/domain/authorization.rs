//! Signer authorization
//!
//! A caller may sign a stage when they belong to the organization holding
//! the role expected for that stage. Otherwise they may sign on behalf of
//! that organization by supplying its secret code.

use tracing::debug;

use crate::errors::{BsdError, Result};
use crate::identity::Directory;
use crate::schemas::{Bordereau, Family, OrgId, Stage, UserId};

/// How a signer was authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerAuthorization {
    /// The caller belongs to an expected organization
    Member,
    /// The caller supplied the expected organization's secret code
    SecurityCode,
}

/// Human name of the role expected to sign a stage
pub fn expected_role(stage: Stage) -> &'static str {
    match stage {
        Stage::Emission => "producer",
        Stage::Work => "worker",
        Stage::Transport(_) => "transporter",
        Stage::Reception | Stage::Operation => "destination",
    }
}

/// Organizations allowed to sign a stage, principal organization first.
pub fn expected_signers(doc: &Bordereau, stage: Stage) -> Vec<&OrgId> {
    let actors = &doc.actors;
    let mut orgs = Vec::new();
    match stage {
        Stage::Emission => {
            orgs.extend(actors.producer_org());
            if matches!(doc.family, Family::Standard | Family::MedicalWaste) {
                orgs.extend(actors.eco_organisme_org());
            }
        }
        Stage::Work => orgs.extend(actors.worker_org()),
        Stage::Transport(n) => orgs.extend(actors.transporter(n).and_then(|t| t.org_id())),
        Stage::Reception | Stage::Operation => orgs.extend(actors.destination_org()),
    }
    orgs
}

/// Decide whether `caller` may sign `stage` of `doc`.
///
/// Membership wins; otherwise a supplied code must match the principal
/// organization's secret code exactly.
pub fn authorize_signer(
    doc: &Bordereau,
    stage: Stage,
    caller: &UserId,
    security_code: Option<&str>,
    directory: &dyn Directory,
) -> Result<SignerAuthorization> {
    let expected = expected_signers(doc, stage);
    let principal = match expected.first() {
        Some(org) => *org,
        None => {
            return Err(BsdError::NotAuthorized(format!(
                "no organization holds the {} role on bordereau {}",
                expected_role(stage),
                doc.id
            )))
        }
    };

    if expected.iter().any(|org| directory.is_member(caller, org)) {
        debug!(id = %doc.id, %stage, %caller, "signer is a member of the expected organization");
        return Ok(SignerAuthorization::Member);
    }

    match security_code {
        Some(code) => match directory.security_code(principal) {
            Some(expected_code) if expected_code == code => {
                debug!(id = %doc.id, %stage, %caller, org = %principal, "signing on behalf with security code");
                Ok(SignerAuthorization::SecurityCode)
            }
            _ => Err(BsdError::InvalidSigningCode(principal.to_string())),
        },
        None => Err(BsdError::NotAuthorized(format!(
            "user {} does not belong to the {} organization {} expected to sign {}",
            caller,
            expected_role(stage),
            principal,
            stage
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        make_directory, make_standard, DESTINATION_USER, ECO_ORGANISME_ORG, ECO_ORGANISME_USER,
        PRODUCER_SECURITY_CODE, PRODUCER_USER, TRANSPORTER_USER,
    };
    use crate::schemas::CompanyInfo;

    #[test]
    fn test_member_of_expected_org() {
        let doc = make_standard("BSD-1");
        let directory = make_directory();
        let auth = authorize_signer(
            &doc,
            Stage::Emission,
            &UserId::from(PRODUCER_USER),
            None,
            &directory,
        )
        .unwrap();
        assert_eq!(auth, SignerAuthorization::Member);
    }

    #[test]
    fn test_wrong_org_without_code_is_not_authorized() {
        let doc = make_standard("BSD-1");
        let directory = make_directory();
        let err = authorize_signer(
            &doc,
            Stage::Emission,
            &UserId::from(TRANSPORTER_USER),
            None,
            &directory,
        )
        .unwrap_err();
        assert_eq!(err.code(), "NOT_AUTHORIZED");
    }

    #[test]
    fn test_matching_security_code() {
        let doc = make_standard("BSD-1");
        let directory = make_directory();
        let auth = authorize_signer(
            &doc,
            Stage::Emission,
            &UserId::from(TRANSPORTER_USER),
            Some(PRODUCER_SECURITY_CODE),
            &directory,
        )
        .unwrap();
        assert_eq!(auth, SignerAuthorization::SecurityCode);
    }

    #[test]
    fn test_mismatching_security_code() {
        let doc = make_standard("BSD-1");
        let directory = make_directory();
        let err = authorize_signer(
            &doc,
            Stage::Emission,
            &UserId::from(TRANSPORTER_USER),
            Some("0000"),
            &directory,
        )
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_SIGNING_CODE");
    }

    #[test]
    fn test_member_ignores_supplied_code() {
        let doc = make_standard("BSD-1");
        let directory = make_directory();
        let auth = authorize_signer(
            &doc,
            Stage::Operation,
            &UserId::from(DESTINATION_USER),
            Some("0000"),
            &directory,
        )
        .unwrap();
        assert_eq!(auth, SignerAuthorization::Member);
    }

    #[test]
    fn test_eco_organisme_may_sign_emission() {
        let mut doc = make_standard("BSD-1");
        doc.actors.eco_organisme = Some(CompanyInfo::named(ECO_ORGANISME_ORG, "Eco"));
        let directory = make_directory();
        let auth = authorize_signer(
            &doc,
            Stage::Emission,
            &UserId::from(ECO_ORGANISME_USER),
            None,
            &directory,
        )
        .unwrap();
        assert_eq!(auth, SignerAuthorization::Member);
    }

    #[test]
    fn test_missing_role_is_not_authorized() {
        let mut doc = make_standard("BSD-1");
        doc.actors.destination = None;
        let directory = make_directory();
        let err = authorize_signer(
            &doc,
            Stage::Operation,
            &UserId::from(DESTINATION_USER),
            Some(PRODUCER_SECURITY_CODE),
            &directory,
        )
        .unwrap_err();
        assert_eq!(err.code(), "NOT_AUTHORIZED");
    }

    #[test]
    fn test_transport_expects_numbered_transporter() {
        let doc = make_standard("BSD-1");
        assert_eq!(expected_signers(&doc, Stage::Transport(1)).len(), 1);
        assert!(expected_signers(&doc, Stage::Transport(2)).is_empty());
    }
}
