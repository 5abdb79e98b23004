//! Property-based tests for domain logic
//!
//! These tests use proptest to verify invariants across many random inputs.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use crate::domain::authorization::SignerAuthorization;
    use crate::domain::cascade::{propagate, CascadeContext};
    use crate::domain::stages::document_stages;
    use crate::domain::status::derive_status;
    use crate::domain::transitions::{apply_signature, Sequencing, SignatureInput};
    use crate::schemas::{
        Acceptation, Bordereau, BordereauId, EngineConfig, OperationMode, SignatureRecord, Stage,
        Status, Subtype, UserId,
    };
    use crate::store::{BordereauStore, MemoryStore};
    use crate::test_support::{
        make_asbestos, make_end_of_life_vehicle, make_human_remains, make_medical_waste,
        make_standard, sign, signed_through_operation, with_accepted_operation,
    };

    // ===== STRATEGY HELPERS =====

    /// Generate a fixture document of any family, with a valid operation
    fn any_document() -> impl Strategy<Value = Bordereau> {
        prop_oneof![
            Just(with_accepted_operation(
                make_standard("BSD-P"),
                "R 1",
                Some(OperationMode::ValorisationEnergetique)
            )),
            Just(with_accepted_operation(make_standard("BSD-P"), "D 13", None)),
            Just(with_accepted_operation(
                make_asbestos("BSDA-P"),
                "R 5",
                Some(OperationMode::Recyclage)
            )),
            Just(with_accepted_operation(make_asbestos("BSDA-P"), "R 13", None)),
            Just(with_accepted_operation(make_medical_waste("DASRI-P"), "D9", None)),
            Just(with_accepted_operation(
                make_end_of_life_vehicle("BSVHU-P"),
                "R 4",
                Some(OperationMode::Recyclage)
            )),
            Just(with_accepted_operation(
                make_human_remains("BSDH-P"),
                "R 1",
                Some(OperationMode::ValorisationEnergetique)
            )),
        ]
    }

    fn any_acceptation() -> impl Strategy<Value = Acceptation> {
        prop_oneof![
            Just(Acceptation::Accepted),
            Just(Acceptation::Refused),
            Just(Acceptation::PartiallyRefused),
        ]
    }

    fn make_input(stage: Stage) -> SignatureInput {
        let now = Utc::now();
        SignatureInput {
            stage,
            record: SignatureRecord {
                author: "Signer".to_string(),
                date: now,
                signatory: UserId::from("user"),
            },
            authorization: SignerAuthorization::Member,
            sequencing: Sequencing::default(),
            now,
        }
    }

    fn continued(id: String) -> Bordereau {
        signed_through_operation(with_accepted_operation(make_standard(&id), "R 13", None))
    }

    // ===== SIGNATURE TESTS =====

    proptest! {
        /// Property: apply_signature never mutates its input
        #[test]
        fn test_apply_signature_never_mutates(doc in any_document(), index in 0usize..4) {
            let stages = document_stages(&doc);
            let stage = stages[index % stages.len()];
            let original = doc.clone();
            let _ = apply_signature(&doc, make_input(stage), &EngineConfig::default());
            prop_assert_eq!(doc, original);
        }

        /// Property: after every signature the stored status is the derived one
        #[test]
        fn test_status_always_derived(doc in any_document()) {
            let config = EngineConfig::default();
            let mut current = doc;
            for stage in document_stages(&current) {
                current = apply_signature(&current, make_input(stage), &config).unwrap();
                prop_assert_eq!(current.status, derive_status(&current));
            }
        }

        /// Property: a signed stage can never be signed again
        #[test]
        fn test_signatures_are_write_once(doc in any_document(), index in 0usize..4) {
            let config = EngineConfig::default();
            let stages = document_stages(&doc);
            let stage = stages[index % stages.len()];
            let signed = apply_signature(&doc, make_input(stage), &config).unwrap();
            let first = signed.signature(stage).cloned();

            let err = apply_signature(&signed, make_input(stage), &config).unwrap_err();
            prop_assert_eq!(err.code(), "ALREADY_SIGNED");
            prop_assert_eq!(signed.signature(stage).cloned(), first);
        }

        /// Property: a refused reception always derives to REFUSED
        #[test]
        fn test_total_refusal_derives_refused(doc in any_document(), acceptation in any_acceptation()) {
            let mut doc = signed_through_operation(doc);
            doc.payload.destination.reception.acceptation = Some(acceptation);
            let status = derive_status(&doc);
            prop_assert_eq!(status == Status::Refused, acceptation == Acceptation::Refused);
        }
    }

    // ===== CASCADE TESTS =====

    proptest! {
        /// Property: a processed chain tail closes every ancestor
        #[test]
        fn test_forwarding_chain_fully_processed(depth in 1usize..10) {
            let config = EngineConfig::default();
            let mut docs = Vec::new();
            for i in 0..depth {
                let mut doc = continued(format!("BSD-{}", i));
                if i > 0 {
                    doc.links.forwarding_of = Some(BordereauId::new(format!("BSD-{}", i - 1)));
                }
                docs.push(doc);
            }
            let store = MemoryStore::with_documents(docs);

            let mut tail = signed_through_operation(with_accepted_operation(
                make_standard("BSD-TAIL"),
                "R 1",
                Some(OperationMode::ValorisationEnergetique),
            ));
            tail.links.forwarding_of = Some(BordereauId::new(format!("BSD-{}", depth - 1)));
            let ctx = CascadeContext { config: &config, now: Utc::now() };

            let changes = store
                .transaction(|uow| propagate(uow, &mut tail, Stage::Operation, Status::Received, ctx))
                .unwrap();
            prop_assert_eq!(changes.len(), depth);
            for doc in store.list().unwrap() {
                prop_assert_eq!(doc.status, Status::Processed);
                prop_assert_eq!(doc.processed_downstream_by, Some(BordereauId::from("BSD-TAIL")));
            }
        }

        /// Property: refusing a group releases every grouped document
        #[test]
        fn test_group_refusal_releases_all(count in 1usize..8) {
            let config = EngineConfig::default();
            let docs: Vec<Bordereau> = (0..count)
                .map(|i| {
                    let mut doc = continued(format!("BSD-{}", i));
                    doc.links.grouped_into = Some(BordereauId::from("BSD-G"));
                    doc
                })
                .collect();
            let store = MemoryStore::with_documents(docs);

            let mut group = make_standard("BSD-G").with_subtype(Subtype::Grouping);
            group.payload.destination.reception.acceptation = Some(Acceptation::Refused);
            sign(&mut group, Stage::Reception);
            group.status = derive_status(&group);
            let ctx = CascadeContext { config: &config, now: Utc::now() };

            store
                .transaction(|uow| propagate(uow, &mut group, Stage::Reception, Status::Sent, ctx))
                .unwrap();
            for doc in store.list().unwrap() {
                prop_assert!(doc.links.grouped_into.is_none());
                prop_assert_eq!(doc.status, derive_status(&doc));
            }
        }

        /// Property: synthesized documents carry the same signature as their synthesis
        #[test]
        fn test_synthesis_children_identical(count in 1usize..8, with_reception in any::<bool>()) {
            let config = EngineConfig::default();
            let docs: Vec<Bordereau> = (0..count)
                .map(|i| {
                    let mut doc = make_medical_waste(&format!("DASRI-{}", i));
                    doc.links.synthesized_by = Some(BordereauId::from("DASRI-S"));
                    doc.payload.destination.reception = Default::default();
                    sign(&mut doc, Stage::Emission);
                    doc.status = derive_status(&doc);
                    doc
                })
                .collect();
            let store = MemoryStore::with_documents(docs);

            let mut synthesis = make_medical_waste("DASRI-S").with_subtype(Subtype::Synthesis);
            sign(&mut synthesis, Stage::Transport(1));
            let stage = if with_reception {
                sign(&mut synthesis, Stage::Reception);
                Stage::Reception
            } else {
                Stage::Transport(1)
            };
            synthesis.status = derive_status(&synthesis);
            let ctx = CascadeContext { config: &config, now: Utc::now() };

            store
                .transaction(|uow| propagate(uow, &mut synthesis, stage, Status::Initial, ctx))
                .unwrap();
            for doc in store.list().unwrap() {
                prop_assert_eq!(doc.signature(stage), synthesis.signature(stage));
                if with_reception {
                    prop_assert_eq!(
                        &doc.payload.destination.reception,
                        &synthesis.payload.destination.reception
                    );
                }
            }
        }
    }
}
