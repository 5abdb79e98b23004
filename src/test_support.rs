//! Shared fixtures for unit tests

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use crate::domain::derive_status;
use crate::fs::{get_directory_path, get_store_path, write_json};
use crate::identity::InMemoryDirectory;
use crate::schemas::{
    Acceptation, Actors, Bordereau, BordereauId, CompanyInfo, CompanyRecord, DirectorySnapshot,
    Family, OperationMode, OrgId, Packaging, PackagingMode, Payload, Producer, SignatureRecord, Stage,
    Status, TransportMode, TransportReceipt, Transporter, UserId, UserRecord, Weight,
};
use crate::store::StoreSnapshot;

pub const PRODUCER_ORG: &str = "11111111100011";
pub const WORKER_ORG: &str = "22222222200022";
pub const TRANSPORTER_ORG: &str = "33333333300033";
pub const DESTINATION_ORG: &str = "44444444400044";
pub const ECO_ORGANISME_ORG: &str = "55555555500055";

pub const PRODUCER_USER: &str = "producer-user";
pub const WORKER_USER: &str = "worker-user";
pub const TRANSPORTER_USER: &str = "transporter-user";
pub const DESTINATION_USER: &str = "destination-user";
pub const ECO_ORGANISME_USER: &str = "eco-user";

pub const PRODUCER_SECURITY_CODE: &str = "1234";

fn company_record(org: &str, name: &str, user: &str) -> CompanyRecord {
    CompanyRecord {
        org_id: OrgId::from(org),
        name: name.to_string(),
        security_code: None,
        allows_takeover_without_signature: false,
        members: vec![UserId::from(user)],
    }
}

fn user_record(id: &str, name: &str) -> UserRecord {
    UserRecord {
        id: UserId::from(id),
        name: name.to_string(),
    }
}

/// Identity snapshot where each fixture org has exactly one member
pub fn make_directory_snapshot() -> DirectorySnapshot {
    let mut producer = company_record(PRODUCER_ORG, "Producteur", PRODUCER_USER);
    producer.security_code = Some(PRODUCER_SECURITY_CODE.to_string());

    DirectorySnapshot {
        companies: vec![
            producer,
            company_record(WORKER_ORG, "Entreprise de travaux", WORKER_USER),
            company_record(TRANSPORTER_ORG, "Transporteur", TRANSPORTER_USER),
            company_record(DESTINATION_ORG, "Installation", DESTINATION_USER),
            company_record(ECO_ORGANISME_ORG, "Eco-organisme", ECO_ORGANISME_USER),
        ],
        users: vec![
            user_record(PRODUCER_USER, "Paul Producteur"),
            user_record(WORKER_USER, "Wanda Travaux"),
            user_record(TRANSPORTER_USER, "Theo Transport"),
            user_record(DESTINATION_USER, "Diane Destination"),
            user_record(ECO_ORGANISME_USER, ""),
        ],
    }
}

pub fn make_directory() -> InMemoryDirectory {
    InMemoryDirectory::from_snapshot(make_directory_snapshot())
}

fn make_transporter() -> Transporter {
    Transporter {
        company: CompanyInfo::named(TRANSPORTER_ORG, "Transporteur"),
        receipt: Some(TransportReceipt {
            number: Some("REC-0001".to_string()),
            department: Some("75".to_string()),
            validity_limit: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).single(),
        }),
        is_exempted_of_receipt: false,
        mode: TransportMode::Road,
        plates: vec!["AB-123-CD".to_string()],
        taken_over_at: None,
    }
}

fn make_packaging() -> Vec<Packaging> {
    vec![Packaging {
        kind: "FUT".to_string(),
        quantity: 2,
    }]
}

/// A published document of `family`, complete for every stage except
/// the operation code
fn make_document(id: &str, family: Family) -> Bordereau {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let actors = Actors {
        producer: Producer {
            company: CompanyInfo::named(PRODUCER_ORG, "Producteur"),
            is_private_individual: false,
        },
        transporters: vec![make_transporter()],
        destination: Some(CompanyInfo::named(DESTINATION_ORG, "Installation")),
        ..Default::default()
    };

    let mut payload = Payload::default();
    payload.waste.code = Some("17 06 05*".to_string());
    payload.waste.weight = Some(Weight::real(1.5));
    payload.destination.reception.date = Some(now);
    payload.destination.reception.weight = Some(Weight::real(1.4));
    payload.destination.reception.acceptation = Some(Acceptation::Accepted);
    payload.destination.operation.date = Some(now);
    payload.destination.operation.treated_weight = Some(Weight::real(1.4));

    let mut doc = Bordereau::new(BordereauId::from(id), family, now)
        .with_actors(actors)
        .with_payload(payload);
    doc.is_draft = false;
    doc.status = Status::Initial;
    doc
}

pub fn make_standard(id: &str) -> Bordereau {
    let mut doc = make_document(id, Family::Standard);
    doc.payload.waste.code = Some("01 03 04*".to_string());
    doc.payload.waste.description = Some("Stériles acidogènes".to_string());
    doc.payload.waste.packagings = make_packaging();
    doc
}

pub fn make_asbestos(id: &str) -> Bordereau {
    let mut doc = make_document(id, Family::Asbestos);
    doc.actors.worker = Some(CompanyInfo::named(WORKER_ORG, "Entreprise de travaux"));
    doc.payload.worker.has_sub_section_three = true;
    doc.payload.worker.certification_number = Some("CERT-42".to_string());
    doc.payload.waste.consistence = Some("SOLIDE".to_string());
    doc.payload.waste.seal_numbers = vec!["SCELLE-1".to_string()];
    doc.payload.destination.cap = Some("CAP-001".to_string());
    doc
}

pub fn make_medical_waste(id: &str) -> Bordereau {
    let mut doc = make_document(id, Family::MedicalWaste);
    doc.payload.waste.code = Some("18 01 03*".to_string());
    doc.payload.waste.adr = Some("UN3291".to_string());
    doc.payload.waste.packagings = make_packaging();
    doc
}

pub fn make_end_of_life_vehicle(id: &str) -> Bordereau {
    let mut doc = make_document(id, Family::EndOfLifeVehicle);
    doc.payload.waste.code = Some("16 01 04*".to_string());
    doc.payload.waste.packaging_mode = Some(PackagingMode::Unit);
    doc.payload.waste.identification_numbers = vec!["VIN-0001".to_string()];
    doc
}

pub fn make_human_remains(id: &str) -> Bordereau {
    let mut doc = make_document(id, Family::HumanRemains);
    doc.payload.waste.code = Some("18 01 02".to_string());
    doc.payload.waste.description = Some("Pièces anatomiques".to_string());
    doc.payload.waste.packagings = make_packaging();
    doc
}

/// Accept the waste and fill the operation block
pub fn with_accepted_operation(
    mut doc: Bordereau,
    code: &str,
    mode: Option<OperationMode>,
) -> Bordereau {
    let now = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
    let destination = &mut doc.payload.destination;
    destination.reception.acceptation = Some(Acceptation::Accepted);
    destination.operation.code = Some(code.to_string());
    destination.operation.mode = mode;
    destination.operation.date = Some(now);
    destination.operation.treated_weight = Some(Weight::real(1.4));
    doc
}

/// Insert a signature record without any checks
pub fn sign(doc: &mut Bordereau, stage: Stage) {
    doc.signatures.insert(
        stage,
        SignatureRecord {
            author: format!("Signer of {}", stage),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            signatory: UserId::from("fixture-user"),
        },
    );
}

/// Sign every stage of the family up to and including the decision stage
pub fn signed_through_operation(mut doc: Bordereau) -> Bordereau {
    for stage in crate::domain::document_stages(&doc) {
        sign(&mut doc, stage);
    }
    doc.status = derive_status(&doc);
    doc
}

/// Temporary workspace holding the fixture directory and `docs`
pub fn make_workspace(docs: Vec<Bordereau>) -> TempDir {
    let temp = TempDir::new().unwrap();
    let snapshot = StoreSnapshot {
        bordereaux: docs,
        ..Default::default()
    };
    write_json(&get_store_path(temp.path()), &snapshot).unwrap();
    write_json(&get_directory_path(temp.path()), &make_directory_snapshot()).unwrap();
    temp
}
