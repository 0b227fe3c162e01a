use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{self, Collection, Document, FieldError};
use crate::error::StoreError;
use crate::ids::IdGenerator;
use crate::repository::Repository;
use crate::traits::CollectionStore;

/// Verdict of a transaction body: whether the collection should be written.
#[derive(Clone, Debug, PartialEq)]
pub enum Change<T> {
    /// Persist the mutated collection, then return the value.
    Commit(T),
    /// Return the value without writing anything.
    Discard(T),
}

/// Errors from document-level operations.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error(transparent)]
    Invalid(#[from] FieldError),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A loaded collection inside the mutation lock.
pub struct Transaction<'a> {
    repo: Repository,
    ids: &'a IdGenerator,
}

impl Transaction<'_> {
    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }

    /// Id for a document about to be inserted in this transaction.
    pub fn next_id(&self) -> String {
        self.ids.next_id(&self.repo)
    }
}

/// A collection store whose mutations are serialized by one lock.
///
/// Every mutation runs load, mutate, replace while holding the lock, so
/// concurrent writers cannot lose each other's updates. Reads take no lock.
/// Nothing is cached between operations: the backend is the only source of
/// truth.
pub struct GuardedStore<S> {
    backend: S,
    write_lock: Mutex<()>,
    ids: IdGenerator,
}

impl<S: CollectionStore> GuardedStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            ids: IdGenerator::new(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the current collection.
    pub fn list(&self) -> Result<Collection, StoreError> {
        self.backend.load()
    }

    /// Run `body` against a freshly loaded collection under the mutation
    /// lock.
    ///
    /// The collection is replaced only when `body` returns
    /// `Ok(Change::Commit(_))`. An error from `body` aborts without writing.
    pub fn transact<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<Change<T>, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let mut txn = Transaction {
            repo: Repository::new(self.backend.load()?),
            ids: &self.ids,
        };
        match body(&mut txn)? {
            Change::Commit(value) => {
                self.backend.replace(txn.repo.as_collection())?;
                debug!(documents = txn.repo.len(), "transaction committed");
                Ok(value)
            }
            Change::Discard(value) => Ok(value),
        }
    }

    /// Create a document from client fields, assigning `id` and
    /// `completed = false`.
    pub fn create(&self, fields: Map<String, Value>) -> Result<Document, OpError> {
        // A rejected create never touches the store.
        document::validate_new(&fields)?;
        self.transact(|txn| {
            let doc = Document::create(txn.next_id(), fields)?;
            txn.repo_mut().insert(doc.clone());
            Ok(Change::Commit(doc))
        })
    }

    /// Shallow-merge `patch` into the document with `id`.
    pub fn update(&self, id: &str, patch: Map<String, Value>) -> Result<Document, OpError> {
        document::validate_patch(&patch)?;
        self.transact(|txn| {
            let before = txn
                .repo()
                .find_by_id(id)
                .cloned()
                .ok_or_else(|| OpError::NotFound(id.to_owned()))?;
            let after = txn
                .repo_mut()
                .update_by_id(id, &patch)
                .cloned()
                .ok_or_else(|| OpError::NotFound(id.to_owned()))?;
            if after == before {
                Ok(Change::Discard(after))
            } else {
                Ok(Change::Commit(after))
            }
        })
    }

    /// Remove the document with `id`.
    pub fn delete(&self, id: &str) -> Result<(), OpError> {
        self.transact(|txn| {
            if txn.repo_mut().delete_by_id(id) {
                Ok(Change::Commit(()))
            } else {
                Err(OpError::NotFound(id.to_owned()))
            }
        })
    }

    /// Remove every completed document. Returns how many were removed; the
    /// file is only rewritten when that is non-zero.
    pub fn clear_completed(&self) -> Result<usize, OpError> {
        self.transact(|txn| {
            let removed = txn.repo_mut().retain(|d| !d.completed());
            if removed > 0 {
                Ok(Change::Commit(removed))
            } else {
                Ok(Change::Discard(0))
            }
        })
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for GuardedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedStore")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
