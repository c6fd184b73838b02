use std::collections::HashMap;

use shale_store::Command;

use crate::doc::{Doc, CREATED_FIELD, ID_FIELD, UPDATED_FIELD};
use crate::encoding::{contains_separator, Key};
use crate::error::DbError;

pub(crate) fn validate_table(table: &str) -> Result<(), DbError> {
    if table.is_empty() {
        return Err(DbError::InvalidArgument("empty table name".to_string()));
    }
    Ok(())
}

/// A user document must carry at least one fully non-empty pair, and no
/// field or value may contain the key separator.
pub(crate) fn validate_doc(doc: &Doc) -> Result<(), DbError> {
    let mut has_pair = false;
    for (field, value) in doc.iter() {
        if contains_separator(field) || contains_separator(value) {
            return Err(DbError::InvalidArgument(format!(
                "field or value contains reserved character '/': {field}"
            )));
        }
        if !field.is_empty() && !value.is_empty() {
            has_pair = true;
        }
    }
    if !has_pair {
        return Err(DbError::InvalidArgument(
            "document has no non-empty field/value pair".to_string(),
        ));
    }
    Ok(())
}

fn stamp(doc: &Doc, id: &str, created: &str, updated: &str) -> Doc {
    let mut stamped = doc.clone();
    stamped.insert(ID_FIELD, id);
    stamped.insert(CREATED_FIELD, created);
    stamped.insert(UPDATED_FIELD, updated);
    stamped
}

fn indexed_pairs(doc: &Doc) -> HashMap<&str, &str> {
    doc.iter()
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect()
}

fn field_put(field: &str, value: &str, id: &str) -> Command {
    Command::put(Key::Field { field, value, id }.encode(), id.as_bytes().to_vec())
}

/// Plan a fresh insert: the primary record plus one index entry per
/// non-empty pair, reserved fields included.
pub(crate) fn plan_add(doc: &Doc, id: &str, now_ms: i64) -> Result<(Doc, Vec<Command>), DbError> {
    let now = now_ms.to_string();
    let stamped = stamp(doc, id, &now, &now);
    let mut batch = vec![Command::put(
        Key::Primary { id }.encode(),
        stamped.to_bytes()?,
    )];
    for (field, value) in indexed_pairs(&stamped) {
        batch.push(field_put(field, value, id));
    }
    Ok((stamped, batch))
}

/// Plan an overwrite of an existing record.
///
/// The index fan-out is diffed pair-by-pair against the old record: entries
/// for pairs that vanished or changed value are deleted, entries for new or
/// changed pairs are written, and unchanged pairs are left alone. Deleting
/// the stale `(field, old value)` entry on a value change is what keeps the
/// index free of entries no live document backs.
pub(crate) fn plan_edit(
    old: &Doc,
    doc: &Doc,
    id: &str,
    now_ms: i64,
) -> Result<(Doc, Vec<Command>), DbError> {
    let created = old.get(CREATED_FIELD).unwrap_or_default().to_string();
    let created = if created.is_empty() {
        now_ms.to_string()
    } else {
        created
    };
    let stamped = stamp(doc, id, &created, &now_ms.to_string());

    let old_pairs = indexed_pairs(old);
    let new_pairs = indexed_pairs(&stamped);

    let mut batch = vec![Command::put(
        Key::Primary { id }.encode(),
        stamped.to_bytes()?,
    )];
    for (&field, &value) in &old_pairs {
        if new_pairs.get(field).copied() != Some(value) {
            batch.push(Command::delete(
                Key::Field { field, value, id }.encode(),
            ));
        }
    }
    for (&field, &value) in &new_pairs {
        if old_pairs.get(field).copied() != Some(value) {
            batch.push(field_put(field, value, id));
        }
    }
    Ok((stamped, batch))
}

/// Plan a delete: the primary record and every index entry the old record
/// fanned out to.
pub(crate) fn plan_remove(old: &Doc, id: &str) -> Vec<Command> {
    let mut batch = vec![Command::delete(Key::Primary { id }.encode())];
    for (field, value) in indexed_pairs(old) {
        batch.push(Command::delete(Key::Field { field, value, id }.encode()));
    }
    batch
}
