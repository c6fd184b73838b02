use std::cmp::Ordering;

use shale_query::{Node, Page, Sort, SortDirection};
use shale_store::Store;
use tracing::debug;

use crate::doc::Doc;
use crate::encoding::{self, Key, KeyPrefix};
use crate::error::DbError;
use crate::expression;
use crate::query::IndexHint;

/// Everything a terminal needs to run: the table, the predicate tree
/// (implicit AND at the top), the frozen index choice, and the output
/// shaping.
pub(crate) struct QuerySpec {
    pub table: String,
    pub nodes: Vec<Node>,
    pub index: Option<IndexHint>,
    pub sort: Vec<Sort>,
    pub page: Option<Page>,
}

pub(crate) fn list<S: Store>(store: &S, spec: &QuerySpec) -> Result<Vec<Doc>, DbError> {
    if spec.sort.is_empty() {
        let mut out = Vec::new();
        let mut skipped = 0usize;
        scan_matches(store, spec, |doc| {
            match spec.page {
                Some(page) => {
                    if skipped < page.cursor {
                        skipped += 1;
                        return true;
                    }
                    if out.len() >= page.size {
                        return false;
                    }
                    out.push(doc);
                    out.len() < page.size
                }
                None => {
                    out.push(doc);
                    true
                }
            }
        })?;
        return Ok(out);
    }

    // Sorting needs the full match set before the window can be cut.
    let mut all = Vec::new();
    scan_matches(store, spec, |doc| {
        all.push(doc);
        true
    })?;
    all.sort_by(|l, r| compare_docs(l, r, &spec.sort));
    Ok(match spec.page {
        Some(page) => all.into_iter().skip(page.cursor).take(page.size).collect(),
        None => all,
    })
}

/// Count every post-filter match. Pagination does not apply to counts.
pub(crate) fn count<S: Store>(store: &S, spec: &QuerySpec) -> Result<u64, DbError> {
    let mut total = 0u64;
    scan_matches(store, spec, |_| {
        total += 1;
        true
    })?;
    Ok(total)
}

/// Stream matches to the caller in scan order. The callback returning
/// false ends the scan before the next key is visited.
pub(crate) fn scroll<S: Store>(
    store: &S,
    spec: &QuerySpec,
    mut handler: impl FnMut(Doc) -> bool,
) -> Result<(), DbError> {
    let mut skipped = 0usize;
    let mut taken = 0usize;
    scan_matches(store, spec, |doc| match spec.page {
        Some(page) => {
            if skipped < page.cursor {
                skipped += 1;
                return true;
            }
            if taken >= page.size {
                return false;
            }
            taken += 1;
            handler(doc) && taken < page.size
        }
        None => handler(doc),
    })
}

/// Drive the scan and feed every matching document to `visit` until it
/// declines or the prefix runs dry.
///
/// Index hits carry the document id as their value; the primary record is
/// fetched per hit, and a hit whose record is gone is an orphan and is
/// skipped. Empty or id-less decodes are skipped the same way.
fn scan_matches<S: Store>(
    store: &S,
    spec: &QuerySpec,
    mut visit: impl FnMut(Doc) -> bool,
) -> Result<(), DbError> {
    let prefix = match &spec.index {
        Some(hint) => KeyPrefix::Field {
            field: &hint.field,
            value: &hint.prefix,
        }
        .encode(),
        None => KeyPrefix::Primary.encode(),
    };
    debug!(
        table = %spec.table,
        index = spec.index.as_ref().map(|h| h.field.as_str()),
        "opening query scan"
    );

    for entry in store.scan_prefix(&spec.table, &prefix)? {
        let (key, value) = entry?;
        let doc = if encoding::is_primary(&key) {
            Doc::from_bytes(&value)
        } else {
            let Ok(id) = std::str::from_utf8(&value) else {
                continue;
            };
            match store.get(&spec.table, &Key::Primary { id }.encode())? {
                Some(bytes) => Doc::from_bytes(&bytes),
                None => continue,
            }
        };
        if doc.is_empty() || doc.id().is_none() {
            continue;
        }
        if !expression::matches(&doc, &spec.nodes) {
            continue;
        }
        if !visit(doc) {
            break;
        }
    }
    Ok(())
}

/// Multi-key comparator: numeric when both sides parse as floats, else
/// lexicographic; equal values fall through to the next key.
pub(crate) fn compare_docs(l: &Doc, r: &Doc, sorts: &[Sort]) -> Ordering {
    for sort in sorts {
        let lv = l.get(&sort.field).unwrap_or_default();
        let rv = r.get(&sort.field).unwrap_or_default();
        if lv == rv {
            continue;
        }
        let ord = match (expression::to_double(lv), expression::to_double(rv)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => lv.cmp(rv),
        };
        let ord = match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
