//! Single-file JSON document store for Docket.
//!
//! A collection of flat JSON documents lives in one file and is rewritten as
//! a whole on every mutation. Layers, leaves first:
//!
//! - [`codec`] -- collection to and from pretty-printed JSON
//! - [`CollectionStore`] -- `load` / `replace` of the whole collection, with
//!   [`FileStore`] and [`InMemoryStore`] backends
//! - [`Repository`] -- pure in-memory lookup, insert, merge, delete
//! - [`GuardedStore`] -- load, mutate, replace under one mutation lock
//!
//! # Design Rules
//!
//! 1. The backing file is the only source of truth; nothing is cached.
//! 2. A missing file is an empty collection. A corrupt file is an error and
//!    is never repaired or truncated.
//! 3. Mutations are serialized; reads are not.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod document;
pub mod error;
pub mod file;
pub mod guarded;
pub mod ids;
pub mod memory;
pub mod repository;
pub mod traits;

pub use document::{Collection, Document, FieldError};
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use guarded::{Change, GuardedStore, OpError, Transaction};
pub use ids::IdGenerator;
pub use memory::InMemoryStore;
pub use repository::Repository;
pub use traits::CollectionStore;
