use std::sync::RwLock;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored classification result. Immutable once created; the store only
/// ever inserts and removes whole records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub predicted_class: String,
    pub confidence_score: f32,
    #[serde(rename = "insertedAt")]
    pub inserted_at: String,
}

/// In-memory collection of classification records.
///
/// Backed by a `Vec` so `list_all` returns insertion order, with a process-
/// wide `RwLock` keeping creates and deletes atomic with respect to reads.
/// Identifiers are random v4 UUIDs and are never reused, deletion included.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: RwLock<Vec<ClassificationRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record for a successful classification and return a copy.
    pub fn create(&self, predicted_class: String, confidence_score: f32) -> ClassificationRecord {
        let record = ClassificationRecord {
            id: Uuid::new_v4(),
            predicted_class,
            confidence_score,
            inserted_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.push(record.clone());
        record
    }

    /// Every current record, in insertion order. Empty is not an error here;
    /// the HTTP layer decides what an empty listing means.
    pub fn list_all(&self) -> Vec<ClassificationRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.clone()
    }

    pub fn get_by_id(&self, id: &Uuid) -> Option<ClassificationRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.iter().find(|r| &r.id == id).cloned()
    }

    /// Remove the record with the given id. Returns whether anything was
    /// removed; "never existed" and "already deleted" are indistinguishable.
    pub fn delete_by_id(&self, id: &Uuid) -> bool {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|r| &r.id != id);
        records.len() < before
    }
}
