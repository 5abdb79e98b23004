//! Signature engine
//!
//! Orchestrates one signature per atomic unit of work:
//! 1. Resolve the concrete stage from the requested signature type
//! 2. Reject a stage that is already signed
//! 3. Check stage ordering and subtype restrictions
//! 4. Validate every field required up to the stage
//! 5. Authorize the caller (membership or secret code)
//! 6. Write the signature record and derive the new status
//! 7. Propagate to linked documents
//! 8. Commit, then notify event sinks

mod clock;
mod events;


use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    apply_signature, authorize_signer, check_sequencing, derive_status, detach, propagate,
    resolve_stage,
    validate_for_stage, CascadeChange, CascadeContext, SequencingContext, SignatureInput,
    ValidationContext,
};
use crate::errors::{BsdError, Result, ValidationIssue};
use crate::identity::Directory;
use crate::schemas::{
    Bordereau, BordereauId, EngineConfig, SignatureRecord, Stage, StageKind, Status, UserId,
};
use crate::store::{BordereauStore, UnitOfWork};

pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{
    BordereauEvent, ChannelEventSink, EventSink, LogEventSink, RecordingEventSink,
};

/// One signature request
#[derive(Debug, Clone)]
pub struct SignRequest {
    pub id: BordereauId,
    pub signature_type: StageKind,
    pub caller: UserId,
    /// Display name recorded on the signature; defaults to the caller's name
    pub author: Option<String>,
    /// Secret code of the organization signed on behalf of
    pub security_code: Option<String>,
    /// Signature date; defaults to now
    pub date: Option<DateTime<Utc>>,
}

impl SignRequest {
    pub fn new(id: impl Into<BordereauId>, signature_type: StageKind, caller: impl Into<UserId>) -> Self {
        SignRequest {
            id: id.into(),
            signature_type,
            caller: caller.into(),
            author: None,
            security_code: None,
            date: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_security_code(mut self, code: impl Into<String>) -> Self {
        self.security_code = Some(code.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Documents written by one committed operation
struct Committed {
    doc: Bordereau,
    events: Vec<BordereauEvent>,
}

fn status_event(previous: Status, doc: &Bordereau) -> BordereauEvent {
    BordereauEvent::StatusChanged {
        id: doc.id.clone(),
        previous,
        status: doc.status,
    }
}

/// The signature and status lifecycle engine
pub struct SignatureEngine<S: BordereauStore> {
    store: S,
    directory: Box<dyn Directory>,
    clock: Box<dyn Clock>,
    config: EngineConfig,
    sinks: Vec<Box<dyn EventSink>>,
}

impl<S: BordereauStore> SignatureEngine<S> {
    pub fn new(store: S, directory: impl Directory + 'static) -> Self {
        SignatureEngine {
            store,
            directory: Box::new(directory),
            clock: Box::new(SystemClock),
            config: EngineConfig::default(),
            sinks: Vec::new(),
        }
    }

    // ===== BUILDER METHODS =====

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    // ===== ACCESSORS =====

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn get(&self, id: &BordereauId) -> Result<Bordereau> {
        self.store.get(id)
    }

    pub fn list(&self) -> Result<Vec<Bordereau>> {
        self.store.list()
    }

    // ===== OPERATIONS =====

    /// Apply one signature and return the updated document.
    ///
    /// Every check, the signature and its cascade run in one transaction;
    /// on failure nothing is committed.
    pub fn apply_signature(&self, request: SignRequest) -> Result<Bordereau> {
        let now = self.clock.now();
        let outcome = self
            .store
            .transaction(|uow| self.sign_in(uow, &request, now));

        match outcome {
            Ok(committed) => {
                info!(
                    id = %committed.doc.id,
                    caller = %request.caller,
                    status = %committed.doc.status,
                    cascaded = committed.events.len() - 1,
                    "signature committed"
                );
                self.notify(&committed.events);
                Ok(committed.doc)
            }
            Err(err) => {
                warn!(
                    id = %request.id,
                    signature_type = %request.signature_type,
                    caller = %request.caller,
                    code = err.code(),
                    "signature rejected: {}",
                    err
                );
                Err(err)
            }
        }
    }

    fn sign_in(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &SignRequest,
        now: DateTime<Utc>,
    ) -> Result<Committed> {
        let doc = uow.get(&request.id)?;
        let stage = resolve_stage(&doc, request.signature_type)?;
        if doc.is_signed(stage) {
            return Err(BsdError::AlreadySigned(format!(
                "stage {} of bordereau {} is already signed",
                stage, doc.id
            )));
        }

        let sequencing = check_sequencing(&doc, stage, &self.sequencing_context(&doc))?;

        let validation = ValidationContext::new(self.config.clone());
        validate_for_stage(&doc, stage, &validation).into_result()?;

        let authorization = authorize_signer(
            &doc,
            stage,
            &request.caller,
            request.security_code.as_deref(),
            self.directory.as_ref(),
        )?;
        debug!(id = %doc.id, %stage, ?authorization, ?sequencing, "signature checks passed");

        let input = SignatureInput {
            stage,
            record: SignatureRecord {
                author: self.author_name(request),
                date: request.date.unwrap_or(now),
                signatory: request.caller.clone(),
            },
            authorization,
            sequencing,
            now,
        };
        let previous = doc.status;
        let mut next = apply_signature(&doc, input, &self.config)?;

        let ctx = CascadeContext {
            config: &self.config,
            now,
        };
        let changes = propagate(uow, &mut next, stage, previous, ctx)?;
        uow.put(next.clone());

        let mut events = vec![status_event(previous, &next)];
        events.extend(
            changes
                .iter()
                .map(|CascadeChange { previous, doc }| status_event(*previous, doc)),
        );
        Ok(Committed { doc: next, events })
    }

    fn sequencing_context(&self, doc: &Bordereau) -> SequencingContext {
        let producer_allows_takeover = doc
            .actors
            .producer_org()
            .map_or(false, |org| self.directory.allows_takeover_without_signature(org));
        SequencingContext {
            producer_allows_takeover,
        }
    }

    /// Author supplied by the caller, else the caller's display name,
    /// else the caller's id.
    fn author_name(&self, request: &SignRequest) -> String {
        request
            .author
            .as_deref()
            .map(str::trim)
            .filter(|author| !author.is_empty())
            .map(str::to_string)
            .or_else(|| self.directory.user_name(&request.caller))
            .unwrap_or_else(|| request.caller.to_string())
    }

    fn notify(&self, events: &[BordereauEvent]) {
        for event in events {
            for sink in &self.sinks {
                sink.publish(event);
            }
        }
    }

    /// Convert a draft into a signable document.
    pub fn publish(&self, id: &BordereauId, caller: &UserId) -> Result<Bordereau> {
        let now = self.clock.now();
        let committed = self.store.transaction(|uow| {
            let doc = uow.get(id)?;
            if !doc.is_draft {
                return Err(BsdError::InvalidDocumentStateForStage(format!(
                    "bordereau {} is already published",
                    id
                )));
            }
            self.require_contributor(&doc, caller)?;

            let previous = doc.status;
            let mut published = doc;
            published.is_draft = false;
            published.status = derive_status(&published);
            published.updated_at = now;
            uow.put(published.clone());
            let events = vec![status_event(previous, &published)];
            Ok(Committed {
                doc: published,
                events,
            })
        })?;

        info!(%id, %caller, status = %committed.doc.status, "bordereau published");
        self.notify(&committed.events);
        Ok(committed.doc)
    }

    /// Soft-delete a document that carries no signature beyond emission.
    ///
    /// Documents grouped into or synthesized by it are detached in the same
    /// transaction.
    pub fn delete(&self, id: &BordereauId, caller: &UserId) -> Result<()> {
        let now = self.clock.now();
        let events = self.store.transaction(|uow| {
            let doc = uow.get(id)?;
            if doc.has_signature_after(Stage::Emission) {
                return Err(BsdError::InvalidDocumentStateForStage(format!(
                    "bordereau {} carries signatures beyond emission and cannot be deleted",
                    id
                )));
            }
            if doc.is_signed(Stage::Emission) {
                let producer_member = doc
                    .actors
                    .producer_org()
                    .map_or(false, |org| self.directory.is_member(caller, org));
                if !producer_member {
                    return Err(BsdError::NotAuthorized(format!(
                        "only the producer may delete bordereau {} once emission is signed",
                        id
                    )));
                }
            } else {
                self.require_contributor(&doc, caller)?;
            }

            let mut deleted = doc;
            let detached = detach(uow, &mut deleted, now);
            deleted.is_deleted = true;
            deleted.updated_at = now;
            uow.put(deleted);
            Ok(detached
                .iter()
                .map(|change| status_event(change.previous, &change.doc))
                .collect::<Vec<_>>())
        })?;

        info!(%id, %caller, detached = events.len(), "bordereau deleted");
        self.notify(&events);
        Ok(())
    }

    /// Run the completeness validator for a stage without signing.
    pub fn check(&self, id: &BordereauId, signature_type: StageKind) -> Result<Vec<ValidationIssue>> {
        let doc = self.store.get(id)?;
        let stage = resolve_stage(&doc, signature_type)?;
        let validation = ValidationContext::new(self.config.clone());
        Ok(validate_for_stage(&doc, stage, &validation).issues)
    }

    /// Insert new documents, deriving their status. Existing ids are refused.
    pub fn import(&self, docs: Vec<Bordereau>) -> Result<usize> {
        let count = docs.len();
        self.store.transaction(|uow| {
            let mut duplicates = Vec::new();
            for doc in &docs {
                if uow.get(&doc.id).is_ok() {
                    duplicates.push(ValidationIssue::new(
                        "id",
                        format!("bordereau {} already exists", doc.id),
                    ));
                }
            }
            if !duplicates.is_empty() {
                return Err(BsdError::ValidationFailed { issues: duplicates });
            }

            let imported = docs
                .into_iter()
                .map(|mut doc| {
                    doc.status = derive_status(&doc);
                    doc
                })
                .collect();
            uow.put_many(imported);
            Ok(())
        })?;

        info!(count, "bordereaux imported");
        Ok(count)
    }

    fn require_contributor(&self, doc: &Bordereau, caller: &UserId) -> Result<()> {
        let contributor = doc
            .actors
            .all_orgs()
            .into_iter()
            .any(|org| self.directory.is_member(caller, org));
        if contributor {
            Ok(())
        } else {
            Err(BsdError::NotAuthorized(format!(
                "user {} belongs to no organization of bordereau {}",
                caller, doc.id
            )))
        }
    }
}
