// Generation record persistence boundary
//
// Persistence of generation records is owned by an external layer; the core
// only needs create/read/update by identifier. The in-memory implementation
// backs tests and single-process embedding.

use crate::models::GenerationRecord;
use crate::utils::lock_mutex_recover;
use std::collections::HashMap;
use std::sync::Mutex;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, String>;

/// Opaque record store for generation records.
///
/// The core reads and writes only the fields it owns (result, token usage,
/// cost, status, versions, current version).
pub trait GenerationStore: Send + Sync {
    fn create(&self, record: GenerationRecord) -> StoreResult<()>;
    fn get(&self, id: &str) -> StoreResult<Option<GenerationRecord>>;
    /// Replace the stored record with `record` (matched by id)
    fn update(&self, record: GenerationRecord) -> StoreResult<()>;
}

/// Simple in-memory store keyed by record id
#[derive(Default)]
pub struct InMemoryGenerationStore {
    records: Mutex<HashMap<String, GenerationRecord>>,
}

impl InMemoryGenerationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, in no particular order
    pub fn all(&self) -> Vec<GenerationRecord> {
        let records = lock_mutex_recover(&self.records);
        records.values().cloned().collect()
    }
}

impl GenerationStore for InMemoryGenerationStore {
    fn create(&self, record: GenerationRecord) -> StoreResult<()> {
        let mut records = lock_mutex_recover(&self.records);
        if records.contains_key(&record.id) {
            return Err(format!("Generation record '{}' already exists", record.id));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<GenerationRecord>> {
        let records = lock_mutex_recover(&self.records);
        Ok(records.get(id).cloned())
    }

    fn update(&self, record: GenerationRecord) -> StoreResult<()> {
        let mut records = lock_mutex_recover(&self.records);
        if !records.contains_key(&record.id) {
            return Err(format!("Generation record '{}' not found", record.id));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }
}
