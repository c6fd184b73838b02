use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use arc_swap::ArcSwap;
use imbl::OrdMap;

use crate::error::StoreError;
use crate::store::{Command, ScanIter, Store};

type TableData = OrdMap<Vec<u8>, Vec<u8>>;

struct TableState {
    data: ArcSwap<TableData>,
    seq: AtomicU64,
}

impl TableState {
    fn new() -> Self {
        Self {
            data: ArcSwap::new(Arc::new(OrdMap::new())),
            seq: AtomicU64::new(0),
        }
    }
}

/// In-memory backend over persistent ordered maps.
///
/// Readers take a cheap snapshot of the current map; writers clone the
/// snapshot, mutate it, and swap it back in under the write lock. Batches
/// are therefore atomic and scans never observe a half-applied batch.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Arc<TableState>>>,
    write_lock: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, name: &str) -> Option<Arc<TableState>> {
        let tables = self.tables.read().unwrap();
        tables.get(name).cloned()
    }

    /// Only one batch may be in the load-mutate-swap window at a time.
    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::Storage(format!("write lock poisoned: {e}")))
    }
}

impl Store for MemoryStore {
    fn create_table(&self, table: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap();
        tables
            .entry(table.to_string())
            .or_insert_with(|| Arc::new(TableState::new()));
        Ok(())
    }

    fn drop_table(&self, table: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap();
        tables.remove(table);
        Ok(())
    }

    fn apply(&self, table: &str, batch: &[Command]) -> Result<(), StoreError> {
        let state = self
            .table(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let _guard = self.write_guard()?;
        let mut data = (*state.data.load_full()).clone();
        for command in batch {
            match command {
                Command::Put { key, value } => {
                    data.insert(key.clone(), value.clone());
                }
                Command::Delete { key } => {
                    data.remove(key);
                }
            }
        }
        state.data.store(Arc::new(data));
        Ok(())
    }

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.table(table) {
            Some(state) => Ok(state.data.load().get(key).cloned()),
            None => Ok(None),
        }
    }

    fn scan_prefix<'a>(&'a self, table: &str, prefix: &[u8]) -> Result<ScanIter<'a>, StoreError> {
        let Some(state) = self.table(table) else {
            return Ok(Box::new(std::iter::empty()));
        };
        let snapshot = state.data.load_full();
        let prefix = prefix.to_vec();
        let entries: Vec<(Vec<u8>, Vec<u8>)> = snapshot
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn next_id(&self, table: &str) -> Result<u64, StoreError> {
        let state = self
            .table(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(state.seq.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
