use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::codec;
use crate::document::Collection;
use crate::error::{StoreError, StoreResult};
use crate::traits::CollectionStore;

/// Collection persisted as one pretty-printed JSON file.
///
/// `replace` writes the new contents to a temp file in the same directory,
/// syncs it, and renames it over the target, so readers see either the old
/// or the new collection, never a torn one.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by `path`. Nothing is touched until the first
    /// `load` or `replace`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Write `bytes` to a temp file next to the target and rename it into
    /// place. With `clobber == false` an existing target is left alone and
    /// the error kind is `AlreadyExists`.
    fn write_atomic(&self, bytes: &[u8], clobber: bool) -> io::Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        if clobber {
            tmp.persist(&self.path).map_err(|e| e.error)?;
        } else {
            tmp.persist_noclobber(&self.path).map_err(|e| e.error)?;
        }
        Ok(())
    }

    /// Create the backing file holding an empty collection.
    ///
    /// Reads run without the mutation lock, so another caller may create
    /// the file first; in that case its contents win.
    fn initialize(&self) -> StoreResult<Collection> {
        let empty = Collection::new();
        match self.write_atomic(&codec::encode(&empty)?, false) {
            Ok(()) => {
                info!(path = %self.path.display(), "initialized empty collection");
                Ok(empty)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let bytes = fs::read(&self.path)
                    .map_err(|e| StoreError::unavailable(&self.path, e))?;
                codec::decode(&bytes)
            }
            Err(e) => Err(StoreError::unavailable(&self.path, e)),
        }
    }
}

impl CollectionStore for FileStore {
    fn load(&self) -> StoreResult<Collection> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let collection = codec::decode(&bytes)?;
                debug!(path = %self.path.display(), documents = collection.len(), "loaded collection");
                Ok(collection)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.initialize(),
            Err(e) => Err(StoreError::unavailable(&self.path, e)),
        }
    }

    fn replace(&self, collection: &Collection) -> StoreResult<()> {
        let bytes = codec::encode(collection)?;
        self.write_atomic(&bytes, true)
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        debug!(path = %self.path.display(), documents = collection.len(), bytes = bytes.len(), "replaced collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => Document::from_fields(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn load_initializes_missing_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("todos.json");
        let store = FileStore::new(&path);

        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }

    #[test]
    fn replace_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("todos.json"));
        let c = vec![
            doc(json!({ "id": "1", "text": "a", "completed": false })),
            doc(json!({ "id": "2", "text": "b", "completed": true })),
        ];

        store.replace(&c).unwrap();
        assert_eq!(store.load().unwrap(), c);
    }

    #[test]
    fn replace_overwrites_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("todos.json"));
        store
            .replace(&vec![doc(json!({ "id": "1" })), doc(json!({ "id": "2" }))])
            .unwrap();
        store.replace(&vec![doc(json!({ "id": "3" }))]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), Some("3"));
    }

    #[test]
    fn replace_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("todos.json"));
        store.replace(&vec![doc(json!({ "id": "1" }))]).unwrap();
        store.replace(&Collection::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["todos.json"]);
    }

    #[test]
    fn corrupt_file_fails_and_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn initialize_never_clobbers_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        fs::write(&path, r#"[{"id":"1","text":"a"}]"#).unwrap();
        let store = FileStore::new(&path);

        let loaded = store.initialize().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"id":"1","text":"a"}]"#);
    }

    #[test]
    fn empty_file_is_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        fs::write(&path, "").unwrap();

        assert!(FileStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn directory_in_place_of_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        fs::create_dir(&path).unwrap();

        let err = FileStore::new(&path).load().unwrap_err();
        assert!(err.is_unavailable());
    }
}
