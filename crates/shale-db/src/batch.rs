use shale_store::{Command, Store};
use tracing::debug;

use crate::database::Database;
use crate::doc::Doc;
use crate::encoding::Key;
use crate::error::DbError;
use crate::planner;

enum BatchOp {
    Add(Doc),
    Edit(String, Doc),
    Remove(String),
}

/// Accumulates add/edit/remove intents against one table and commits them
/// as a single atomic store batch.
///
/// Plans are computed in order against the state at batch start: two adds
/// mint distinct ids, but an edit of an id added earlier in the same batch
/// reads the store, which has not seen that add yet — the result of such a
/// pair is undefined.
pub struct Batch<'a, S: Store> {
    db: &'a Database<S>,
    table: String,
    ops: Vec<BatchOp>,
}

impl<'a, S: Store> Batch<'a, S> {
    pub(crate) fn new(db: &'a Database<S>, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            ops: Vec::new(),
        }
    }

    pub fn add(mut self, doc: Doc) -> Self {
        self.ops.push(BatchOp::Add(doc));
        self
    }

    pub fn edit(mut self, id: impl Into<String>, doc: Doc) -> Self {
        self.ops.push(BatchOp::Edit(id.into(), doc));
        self
    }

    pub fn remove(mut self, id: impl Into<String>) -> Self {
        self.ops.push(BatchOp::Remove(id.into()));
        self
    }

    /// Plan every op, commit once, and return one id per op: freshly minted
    /// for adds, echoed for edits and removes (even when they were no-ops).
    ///
    /// Every op is validated before the store is touched, so a rejected
    /// batch leaves no trace — not even a lazily-created table.
    pub fn exec(self) -> Result<Vec<String>, DbError> {
        planner::validate_table(&self.table)?;
        for op in &self.ops {
            match op {
                BatchOp::Add(doc) | BatchOp::Edit(_, doc) => planner::validate_doc(doc)?,
                BatchOp::Remove(_) => {}
            }
        }

        let mut state = self.db.lock_gate()?;
        if self.ops.iter().any(|op| matches!(op, BatchOp::Add(_))) {
            self.db.ensure_table(&mut state, &self.table)?;
        }

        let store = self.db.store();
        let mut commands: Vec<Command> = Vec::new();
        let mut ids = Vec::with_capacity(self.ops.len());

        for op in &self.ops {
            match op {
                BatchOp::Add(doc) => {
                    let id = store.next_id(&self.table)?.to_string();
                    let (_, batch) = planner::plan_add(doc, &id, crate::database::now_millis())?;
                    commands.extend(batch);
                    ids.push(id);
                }
                BatchOp::Edit(id, doc) => {
                    if let Some(bytes) = store.get(&self.table, &Key::Primary { id }.encode())? {
                        let old = Doc::from_bytes(&bytes);
                        let (_, batch) =
                            planner::plan_edit(&old, doc, id, crate::database::now_millis())?;
                        commands.extend(batch);
                    }
                    ids.push(id.clone());
                }
                BatchOp::Remove(id) => {
                    if let Some(bytes) = store.get(&self.table, &Key::Primary { id }.encode())? {
                        let old = Doc::from_bytes(&bytes);
                        commands.extend(planner::plan_remove(&old, id));
                    }
                    ids.push(id.clone());
                }
            }
        }

        if !commands.is_empty() {
            store.apply(&self.table, &commands)?;
        }
        debug!(table = %self.table, ops = self.ops.len(), commands = commands.len(), "committed batch");
        Ok(ids)
    }
}
