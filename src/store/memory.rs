//! In-memory store

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::errors::Result;
use crate::schemas::{Bordereau, BordereauId};

use super::{lock_poisoned, BordereauStore, StagedWork, UnitOfWork};

/// Store keeping every document in a mutex-guarded map
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<BordereauId, Bordereau>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(docs: impl IntoIterator<Item = Bordereau>) -> Self {
        let map = docs.into_iter().map(|doc| (doc.id.clone(), doc)).collect();
        MemoryStore {
            docs: Mutex::new(map),
        }
    }
}

impl BordereauStore for MemoryStore {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>,
    {
        let mut docs = self.docs.lock().map_err(lock_poisoned)?;
        let mut work = StagedWork::new(&docs);
        let value = f(&mut work)?;
        let staged = work.into_staged();
        docs.extend(staged);
        Ok(value)
    }

    fn list(&self) -> Result<Vec<Bordereau>> {
        let docs = self.docs.lock().map_err(lock_poisoned)?;
        Ok(docs.values().filter(|d| !d.is_deleted).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BsdError;
    use crate::test_support::make_standard;
    use std::sync::Arc;

    #[test]
    fn test_commit_on_ok() {
        let store = MemoryStore::new();
        store
            .transaction(|uow| {
                uow.put(make_standard("BSD-1"));
                Ok(())
            })
            .unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert!(store.get(&BordereauId::from("BSD-1")).is_ok());
    }

    #[test]
    fn test_rollback_on_error() {
        let store = MemoryStore::with_documents(vec![make_standard("BSD-1")]);
        let result: Result<()> = store.transaction(|uow| {
            let mut doc = uow.get(&BordereauId::from("BSD-1"))?;
            doc.payload.waste.description = Some("partial".to_string());
            uow.put(doc);
            uow.put(make_standard("BSD-2"));
            Err(BsdError::TransactionFailed("boom".to_string()))
        });

        assert!(result.is_err());
        let doc = store.get(&BordereauId::from("BSD-1")).unwrap();
        assert_ne!(doc.payload.waste.description.as_deref(), Some("partial"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_transactions_are_serialized() {
        let store = Arc::new(MemoryStore::with_documents(vec![make_standard("BSD-1")]));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.transaction(|uow| {
                    let mut doc = uow.get(&BordereauId::from("BSD-1"))?;
                    let count = doc.payload.waste.seal_numbers.len();
                    doc.payload.waste.seal_numbers.push(format!("S{}", count));
                    uow.put(doc);
                    Ok(())
                })
            }));
        }
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let doc = store.get(&BordereauId::from("BSD-1")).unwrap();
        let before = make_standard("BSD-1").payload.waste.seal_numbers.len();
        assert_eq!(doc.payload.waste.seal_numbers.len(), before + 8);
    }
}
