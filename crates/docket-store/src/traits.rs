use crate::document::Collection;
use crate::error::StoreResult;

/// Persistence boundary for a single collection.
///
/// All implementations must satisfy these invariants:
/// - The backing location holds the whole collection as one unit. There is
///   no append or partial write: every `replace` rewrites everything.
/// - An absent backing location is an empty collection, not an error.
/// - Unreadable content is reported as corruption and left untouched.
/// - All I/O errors are propagated, never silently ignored.
pub trait CollectionStore: Send + Sync {
    /// Read the full collection.
    ///
    /// Initializes the backing location to an empty collection if it does
    /// not exist yet.
    fn load(&self) -> StoreResult<Collection>;

    /// Overwrite the backing location with `collection`.
    ///
    /// Either the whole new collection is visible afterwards or, on error,
    /// callers must not assume anything was written.
    fn replace(&self, collection: &Collection) -> StoreResult<()>;
}

impl<S: CollectionStore + ?Sized> CollectionStore for std::sync::Arc<S> {
    fn load(&self) -> StoreResult<Collection> {
        (**self).load()
    }

    fn replace(&self, collection: &Collection) -> StoreResult<()> {
        (**self).replace(collection)
    }
}
