use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use shale_store::{RedbStore, Store, StoreError};
use tracing::debug;

use crate::doc::Doc;
use crate::encoding::Key;
use crate::error::DbError;
use crate::planner;
use crate::query::Query;

/// State owned by the write gate: the monotone set of tables known to
/// exist. Entries are added on first write and removed only by drop.
pub(crate) struct WriteState {
    tables: HashSet<String>,
}

/// An embedded document store over an ordered key/value engine.
///
/// Every mutating operation runs under a single per-database mutex held
/// across its read-plan-commit window, so committed mutations are totally
/// ordered and id assignment cannot race. Queries take no lock and lean on
/// the store's snapshot-consistent scans.
pub struct Database<S: Store> {
    store: S,
    gate: Mutex<WriteState>,
}

impl Database<RedbStore> {
    /// Open (or create) a redb-backed database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Ok(Self::from_store(RedbStore::open(path.as_ref())?))
    }
}

impl<S: Store> Database<S> {
    /// Wrap any ordered KV engine.
    pub fn from_store(store: S) -> Self {
        Self {
            store,
            gate: Mutex::new(WriteState {
                tables: HashSet::new(),
            }),
        }
    }

    /// The underlying store. Mutating it directly bypasses the write gate.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn lock_gate(&self) -> Result<MutexGuard<'_, WriteState>, DbError> {
        self.gate
            .lock()
            .map_err(|e| DbError::Store(StoreError::Storage(format!("write gate poisoned: {e}"))))
    }

    /// Tables come into being on first write; the gate-owned cache makes
    /// the common case a set lookup.
    pub(crate) fn ensure_table(
        &self,
        state: &mut WriteState,
        table: &str,
    ) -> Result<(), DbError> {
        if state.tables.contains(table) {
            return Ok(());
        }
        self.store.create_table(table)?;
        state.tables.insert(table.to_string());
        Ok(())
    }

    /// Insert a document. Returns the assigned id.
    pub fn add(&self, table: &str, doc: &Doc) -> Result<String, DbError> {
        planner::validate_table(table)?;
        planner::validate_doc(doc)?;

        let mut state = self.lock_gate()?;
        self.ensure_table(&mut state, table)?;
        let id = self.store.next_id(table)?.to_string();
        let (_, batch) = planner::plan_add(doc, &id, now_millis())?;
        self.store.apply(table, &batch)?;
        debug!(table, id = %id, commands = batch.len(), "added document");
        Ok(id)
    }

    /// Overwrite the document at `id`. Editing an absent id is a clean
    /// no-op, not an error.
    pub fn edit(&self, table: &str, id: &str, doc: &Doc) -> Result<(), DbError> {
        planner::validate_table(table)?;
        planner::validate_doc(doc)?;

        let _state = self.lock_gate()?;
        let Some(bytes) = self.store.get(table, &Key::Primary { id }.encode())? else {
            return Ok(());
        };
        let old = Doc::from_bytes(&bytes);
        let (_, batch) = planner::plan_edit(&old, doc, id, now_millis())?;
        self.store.apply(table, &batch)?;
        debug!(table, id = %id, commands = batch.len(), "edited document");
        Ok(())
    }

    /// Delete the document at `id` and its whole index fan-out. Removing
    /// an absent id is a clean no-op.
    pub fn remove(&self, table: &str, id: &str) -> Result<(), DbError> {
        planner::validate_table(table)?;

        let _state = self.lock_gate()?;
        let Some(bytes) = self.store.get(table, &Key::Primary { id }.encode())? else {
            return Ok(());
        };
        let old = Doc::from_bytes(&bytes);
        let batch = planner::plan_remove(&old, id);
        self.store.apply(table, &batch)?;
        debug!(table, id = %id, commands = batch.len(), "removed document");
        Ok(())
    }

    /// Drop a table and everything in it.
    pub fn drop_table(&self, table: &str) -> Result<(), DbError> {
        planner::validate_table(table)?;

        let mut state = self.lock_gate()?;
        self.store.drop_table(table)?;
        state.tables.remove(table);
        debug!(table, "dropped table");
        Ok(())
    }

    /// Start an atomic multi-op batch against one table.
    pub fn batch(&self, table: &str) -> crate::batch::Batch<'_, S> {
        crate::batch::Batch::new(self, table)
    }

    /// Start a fluent query against one table.
    pub fn query(&self, table: &str) -> Query<'_, S> {
        Query::new(self, table)
    }
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
