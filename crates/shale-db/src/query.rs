use shale_query::{render, Condition, LogicalOp, Node, Operator, Page, Sort, SortDirection, SubQuery};
use shale_store::Store;

use crate::database::Database;
use crate::doc::Doc;
use crate::error::DbError;
use crate::executor::{self, QuerySpec};

/// The single index choice driving a query's scan range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHint {
    pub field: String,
    /// Value prefix the scan opens at; the full value for an equality hit.
    pub prefix: String,
}

/// The query plan as reported by [`Query::explain`]: the rendered predicate
/// and the chosen index, if any. No store access is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explain {
    pub predicate: String,
    pub index: Option<IndexHint>,
}

/// Fluent query over one table.
///
/// Leaves accumulate under an implicit top-level AND; `must`/`should` nest
/// whole sub-expressions. At most one index is chosen while the query is
/// built — the first top-level `eq` or `left_like`, or the first `in_` whose
/// candidates share a byte prefix — and the choice is frozen from then on.
/// Everything else is answered by post-filtering the scan stream.
///
/// The builder is consumed by its terminal (`one`, `list`, `count`,
/// `scroll`); `explain` borrows it and can be called beforehand.
pub struct Query<'a, S: Store> {
    db: &'a Database<S>,
    spec: QuerySpec,
}

impl<'a, S: Store> Query<'a, S> {
    pub(crate) fn new(db: &'a Database<S>, table: &str) -> Self {
        Self {
            db,
            spec: QuerySpec {
                table: table.to_string(),
                nodes: Vec::new(),
                index: None,
                sort: Vec::new(),
                page: None,
            },
        }
    }

    fn push_one(mut self, field: &str, operator: Operator, value: &str) -> Self {
        if field.is_empty() || value.is_empty() {
            return self;
        }
        self.spec.nodes.push(Node::Condition(Condition::new(
            field,
            operator,
            vec![value.to_string()],
        )));
        self
    }

    fn push_many(mut self, field: &str, operator: Operator, values: &[&str]) -> Self {
        if field.is_empty() || values.is_empty() {
            return self;
        }
        self.spec.nodes.push(Node::Condition(Condition::new(
            field,
            operator,
            values.iter().map(|v| v.to_string()).collect(),
        )));
        self
    }

    fn push_bare(mut self, field: &str, operator: Operator) -> Self {
        if field.is_empty() {
            return self;
        }
        self.spec
            .nodes
            .push(Node::Condition(Condition::new(field, operator, vec![])));
        self
    }

    fn select_index(&mut self, field: &str, prefix: String) {
        if self.spec.index.is_none() && !prefix.is_empty() {
            self.spec.index = Some(IndexHint {
                field: field.to_string(),
                prefix,
            });
        }
    }

    pub fn eq(mut self, field: &str, value: &str) -> Self {
        if !field.is_empty() && !value.is_empty() {
            self.select_index(field, value.to_string());
        }
        self.push_one(field, Operator::Eq, value)
    }

    pub fn ne(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::Ne, value)
    }

    pub fn gt(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::Gt, value)
    }

    pub fn gte(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::Gte, value)
    }

    pub fn lt(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::Lt, value)
    }

    pub fn lte(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::Lte, value)
    }

    /// Set membership. When the candidates share a common byte prefix the
    /// scan opens there instead of walking the whole table.
    pub fn in_(mut self, field: &str, values: &[&str]) -> Self {
        if !field.is_empty() {
            let non_empty: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
            if !non_empty.is_empty() {
                self.select_index(field, common_prefix(&non_empty));
            }
        }
        self.push_many(field, Operator::In, values)
    }

    pub fn not_in(self, field: &str, values: &[&str]) -> Self {
        self.push_many(field, Operator::NotIn, values)
    }

    /// Substring match. Full scan; post-filter only.
    pub fn like(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::Like, value)
    }

    /// Prefix match. Drives the field index when it is the first qualifying
    /// leaf.
    pub fn left_like(mut self, field: &str, value: &str) -> Self {
        if !field.is_empty() && !value.is_empty() {
            self.select_index(field, value.to_string());
        }
        self.push_one(field, Operator::LeftLike, value)
    }

    pub fn right_like(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::RightLike, value)
    }

    pub fn exist(self, field: &str) -> Self {
        self.push_bare(field, Operator::Exist)
    }

    pub fn not_exist(self, field: &str) -> Self {
        self.push_bare(field, Operator::NotExist)
    }

    /// AND a sub-expression into the query. Its leaves never influence
    /// index selection.
    pub fn must(mut self, sub: SubQuery) -> Self {
        if !sub.is_empty() {
            self.spec
                .nodes
                .push(Node::Group(sub.into_group(LogicalOp::And)));
        }
        self
    }

    /// OR a sub-expression into the query. Its leaves never influence
    /// index selection.
    pub fn should(mut self, sub: SubQuery) -> Self {
        if !sub.is_empty() {
            self.spec
                .nodes
                .push(Node::Group(sub.into_group(LogicalOp::Or)));
        }
        self
    }

    /// Ascending multi-key sort. Replaces any previous ordering.
    pub fn asc(self, fields: &[&str]) -> Self {
        self.sort(SortDirection::Asc, fields)
    }

    /// Descending multi-key sort. Replaces any previous ordering.
    pub fn desc(self, fields: &[&str]) -> Self {
        self.sort(SortDirection::Desc, fields)
    }

    fn sort(mut self, direction: SortDirection, fields: &[&str]) -> Self {
        self.spec.sort = fields
            .iter()
            .map(|f| Sort {
                field: f.to_string(),
                direction,
            })
            .collect();
        self
    }

    /// Offset/limit window, MySQL `LIMIT cursor, size`.
    pub fn limit(mut self, cursor: usize, size: usize) -> Self {
        self.spec.page = Some(Page { cursor, size });
        self
    }

    /// `limit(0, size)`.
    pub fn take(self, size: usize) -> Self {
        self.limit(0, size)
    }

    /// First match, or `None`.
    pub fn one(mut self) -> Result<Option<Doc>, DbError> {
        self.spec.page = Some(Page { cursor: 0, size: 1 });
        let mut docs = executor::list(self.db.store(), &self.spec)?;
        Ok(docs.pop())
    }

    /// All matches, shaped by sort and limit.
    pub fn list(self) -> Result<Vec<Doc>, DbError> {
        executor::list(self.db.store(), &self.spec)
    }

    /// Number of matches. Ignores any limit.
    pub fn count(mut self) -> Result<u64, DbError> {
        self.spec.page = None;
        executor::count(self.db.store(), &self.spec)
    }

    /// Stream matches in scan order; return false from the handler to stop.
    pub fn scroll(self, handler: impl FnMut(Doc) -> bool) -> Result<(), DbError> {
        executor::scroll(self.db.store(), &self.spec, handler)
    }

    /// Report the rendered predicate and chosen index without executing.
    pub fn explain(&self) -> Explain {
        Explain {
            predicate: render(&self.spec.nodes),
            index: self.spec.index.clone(),
        }
    }
}

/// Longest common byte prefix, trimmed back to a character boundary so the
/// scan prefix stays valid UTF-8. A shorter prefix only widens the scan;
/// the post-filter still decides membership.
fn common_prefix(values: &[&str]) -> String {
    let Some((first, rest)) = values.split_first() else {
        return String::new();
    };
    let mut len = first.len();
    for value in rest {
        len = len.min(
            first
                .as_bytes()
                .iter()
                .zip(value.as_bytes())
                .take_while(|(a, b)| a == b)
                .count(),
        );
    }
    while len > 0 && !first.is_char_boundary(len) {
        len -= 1;
    }
    first[..len].to_string()
}
