use std::sync::Mutex;

use chrono::Utc;

use crate::repository::Repository;

/// Assigns document ids from the creation time in milliseconds.
///
/// Ids are decimal strings. A generator never repeats an id it issued
/// before, and skips ids already present in the repository, so two creates
/// in the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Mutex<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for a document about to be inserted into `repo`.
    pub fn next_id(&self, repo: &Repository) -> String {
        self.next_id_at(Utc::now().timestamp_millis(), repo)
    }

    fn next_id_at(&self, now_ms: i64, repo: &Repository) -> String {
        let mut last = self.last.lock().expect("id generator mutex poisoned");
        let mut candidate = now_ms.max(*last + 1);
        while repo.contains_id(&candidate.to_string()) {
            candidate += 1;
        }
        *last = candidate;
        candidate.to_string()
    }
}
