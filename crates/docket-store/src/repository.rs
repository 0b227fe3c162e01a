use serde_json::{Map, Value};

use crate::document::{Collection, Document};

/// In-memory view of a loaded collection for the duration of one operation.
///
/// Pure: no I/O. Lookups are linear scans matching the first document whose
/// id is equal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Repository {
    docs: Collection,
}

impl Repository {
    pub fn new(docs: Collection) -> Self {
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.docs.iter().position(|d| d.id() == Some(id))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Document> {
        self.position(id).map(|i| &self.docs[i])
    }

    /// Append a document. The caller guarantees its id is not taken.
    pub fn insert(&mut self, doc: Document) {
        debug_assert!(doc.id().is_some_and(|id| !self.contains_id(id)));
        self.docs.push(doc);
    }

    /// Shallow-merge `patch` into the document with `id`.
    ///
    /// Returns the merged document, or `None` if no document has that id.
    pub fn update_by_id(&mut self, id: &str, patch: &Map<String, Value>) -> Option<&Document> {
        let index = self.position(id)?;
        let doc = &mut self.docs[index];
        doc.merge(patch);
        Some(&*doc)
    }

    /// Remove the document with `id`. Returns whether anything was removed.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.docs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Keep only documents matching `keep`, in order. Returns how many were
    /// removed.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Document) -> bool,
    {
        let before = self.docs.len();
        self.docs.retain(keep);
        before - self.docs.len()
    }

    pub fn into_collection(self) -> Collection {
        self.docs
    }

    pub fn as_collection(&self) -> &Collection {
        &self.docs
    }
}

impl From<Collection> for Repository {
    fn from(docs: Collection) -> Self {
        Self::new(docs)
    }
}
