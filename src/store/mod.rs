//! Storage service
//!
//! A store runs a closure against a unit of work. Writes are staged in
//! the unit of work and only published when the closure returns `Ok`.

mod file;
mod memory;

use std::collections::BTreeMap;

use crate::errors::{BsdError, Result};
use crate::schemas::{Bordereau, BordereauId, LinkKind};

pub use file::{JsonFileStore, StoreSnapshot};
pub use memory::MemoryStore;

/// Reads and staged writes inside one atomic transaction
pub trait UnitOfWork {
    /// Read one document; deleted documents are reported as not found
    fn get(&self, id: &BordereauId) -> Result<Bordereau>;

    /// Stage a write of one document
    fn put(&mut self, doc: Bordereau);

    /// Documents whose `kind` link points at `id`
    fn linked_to(&self, id: &BordereauId, kind: LinkKind) -> Vec<Bordereau>;

    /// Stage a multi-row update
    fn put_many(&mut self, docs: Vec<Bordereau>) {
        for doc in docs {
            self.put(doc);
        }
    }
}

/// A transactional document store
pub trait BordereauStore: Send + Sync {
    /// Run `f` atomically. Concurrent transactions are serialized and
    /// nothing staged by `f` is visible unless it returns `Ok`.
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>;

    /// Every non-deleted document, ordered by id
    fn list(&self) -> Result<Vec<Bordereau>>;

    /// Read one document outside of any transaction
    fn get(&self, id: &BordereauId) -> Result<Bordereau> {
        self.transaction(|uow| uow.get(id))
    }
}

/// Unit of work staging writes over a committed snapshot
pub(crate) struct StagedWork<'a> {
    committed: &'a BTreeMap<BordereauId, Bordereau>,
    staged: BTreeMap<BordereauId, Bordereau>,
}

impl<'a> StagedWork<'a> {
    pub(crate) fn new(committed: &'a BTreeMap<BordereauId, Bordereau>) -> Self {
        StagedWork {
            committed,
            staged: BTreeMap::new(),
        }
    }

    pub(crate) fn into_staged(self) -> BTreeMap<BordereauId, Bordereau> {
        self.staged
    }

    fn current(&self, id: &BordereauId) -> Option<&Bordereau> {
        self.staged.get(id).or_else(|| self.committed.get(id))
    }
}

impl UnitOfWork for StagedWork<'_> {
    fn get(&self, id: &BordereauId) -> Result<Bordereau> {
        match self.current(id) {
            Some(doc) if !doc.is_deleted => Ok(doc.clone()),
            _ => Err(BsdError::NotFound(id.to_string())),
        }
    }

    fn put(&mut self, doc: Bordereau) {
        self.staged.insert(doc.id.clone(), doc);
    }

    fn linked_to(&self, id: &BordereauId, kind: LinkKind) -> Vec<Bordereau> {
        let staged = self.staged.values();
        let committed = self
            .committed
            .values()
            .filter(|doc| !self.staged.contains_key(&doc.id));
        let mut found: Vec<Bordereau> = staged
            .chain(committed)
            .filter(|doc| !doc.is_deleted && doc.links.get(kind) == Some(id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }
}

pub(crate) fn lock_poisoned<E>(_: E) -> BsdError {
    BsdError::TransactionFailed("store lock poisoned by a panicking transaction".to_string())
}
