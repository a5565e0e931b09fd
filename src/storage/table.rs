//! In-memory table for one record kind

use std::collections::{BTreeMap, HashMap};
use crate::{Error, Result};
use crate::record::Record;
use super::Predicate;

/// An insertion-ordered table keyed by identifier.
///
/// Rows are kept under a monotonically increasing sequence number so that
/// scans return records in creation order even after deletions; a hash
/// index maps identifiers to their sequence number for point lookups.
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    rows: BTreeMap<u64, R>,
    index: HashMap<String, u64>,
    next_seq: u64,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<R: Record> Table<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point lookup by identifier
    pub fn get(&self, id: &str) -> Option<&R> {
        self.index.get(id).and_then(|seq| self.rows.get(seq))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// First record matching the predicate, in insertion order
    pub fn find_one(&self, predicate: &Predicate) -> Option<&R> {
        if let Some(id) = predicate.as_id() {
            return self.get(id);
        }
        self.rows.values().find(|record| predicate.matches(*record))
    }

    /// All records matching the predicate (all records if `None`), in
    /// insertion order
    pub fn find_many(&self, predicate: Option<&Predicate>) -> Vec<&R> {
        match predicate {
            Some(predicate) => {
                if let Some(id) = predicate.as_id() {
                    return self.get(id).into_iter().collect();
                }
                self.rows.values().filter(|record| predicate.matches(*record)).collect()
            }
            None => self.rows.values().collect(),
        }
    }

    /// Insert a new record under a freshly generated identifier
    pub fn create(&mut self, draft: R::Draft) -> R {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert(R::from_draft(id, draft))
    }

    /// Insert a new record under a caller-chosen identifier
    pub fn insert_with_id(&mut self, id: impl Into<String>, draft: R::Draft) -> Result<R> {
        let id = id.into();
        if self.contains(&id) {
            return Err(Error::Conflict(format!("{} {} already exists", R::KIND, id)));
        }
        Ok(self.insert(R::from_draft(id, draft)))
    }

    fn insert(&mut self, record: R) -> R {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(record.id().to_string(), seq);
        self.rows.insert(seq, record.clone());
        record
    }

    /// Merge a patch into an existing record and return the updated value
    pub fn update(&mut self, id: &str, patch: R::Patch) -> Result<R> {
        let record = self
            .index
            .get(id)
            .and_then(|seq| self.rows.get_mut(seq))
            .ok_or_else(|| not_found::<R>(id))?;
        record.apply(patch);
        Ok(record.clone())
    }

    /// Remove a record and return its prior value
    pub fn delete(&mut self, id: &str) -> Result<R> {
        let seq = self.index.remove(id).ok_or_else(|| not_found::<R>(id))?;
        self.rows
            .remove(&seq)
            .ok_or_else(|| Error::InvariantViolation(format!("{} {} indexed but not stored", R::KIND, id)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }
}

fn not_found<R: Record>(id: &str) -> Error {
    Error::NotFound {
        kind: R::KIND,
        id: id.to_string(),
    }
}
