use shale_query::{Condition, Group, LogicalOp, Node, Operator};

use crate::doc::{is_reserved, Doc};

/// Evaluate a top-level predicate list (implicit AND) against a document.
///
/// A leaf that references an absent field is false, never an error, so one
/// malformed or sparse document can only exclude itself from a result.
pub(crate) fn matches(doc: &Doc, nodes: &[Node]) -> bool {
    nodes.iter().all(|node| matches_node(doc, node))
}

fn matches_node(doc: &Doc, node: &Node) -> bool {
    match node {
        Node::Condition(cond) => matches_condition(doc, cond),
        Node::Group(group) => matches_group(doc, group),
    }
}

fn matches_group(doc: &Doc, group: &Group) -> bool {
    match group.logical {
        LogicalOp::And => group.children.iter().all(|n| matches_node(doc, n)),
        LogicalOp::Or => group.children.iter().any(|n| matches_node(doc, n)),
    }
}

fn matches_condition(doc: &Doc, cond: &Condition) -> bool {
    match cond.operator {
        // Existence is the one place reserved fields are inexpressible:
        // they are always present, so both probes answer false.
        Operator::Exist => !is_reserved(&cond.field) && doc.has_field(&cond.field),
        Operator::NotExist => !is_reserved(&cond.field) && !doc.has_field(&cond.field),
        _ => match doc.get(&cond.field) {
            Some(actual) => matches_value(actual, cond),
            None => false,
        },
    }
}

fn matches_value(actual: &str, cond: &Condition) -> bool {
    match cond.operator {
        Operator::Eq => actual == cond.value(),
        Operator::Ne => actual != cond.value(),
        Operator::Gt => compare(actual, cond.value(), |o| o == std::cmp::Ordering::Greater),
        Operator::Gte => compare(actual, cond.value(), |o| o != std::cmp::Ordering::Less),
        Operator::Lt => compare(actual, cond.value(), |o| o == std::cmp::Ordering::Less),
        Operator::Lte => compare(actual, cond.value(), |o| o != std::cmp::Ordering::Greater),
        Operator::In => cond.values.iter().any(|v| v == actual),
        Operator::NotIn => !cond.values.iter().any(|v| v == actual),
        Operator::Like => actual.contains(cond.value()),
        Operator::LeftLike => actual.starts_with(cond.value()),
        Operator::RightLike => actual.ends_with(cond.value()),
        Operator::Exist | Operator::NotExist => unreachable!("handled before field lookup"),
    }
}

fn compare(left: &str, right: &str, predicate: fn(std::cmp::Ordering) -> bool) -> bool {
    match (to_double(left), to_double(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).map(predicate).unwrap_or(false),
        _ => false,
    }
}

/// Numeric coercion for comparisons and sorting: a string with no decimal
/// point gets `.0` appended before parsing, matching the store's all-string
/// value model.
pub(crate) fn to_double(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    if s.contains('.') {
        s.parse().ok()
    } else {
        format!("{s}.0").parse().ok()
    }
}
