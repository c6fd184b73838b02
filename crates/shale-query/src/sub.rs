use crate::condition::{Condition, Group, LogicalOp, Node};
use crate::operator::Operator;

/// Builder for a composed sub-expression, fed to a query's `must`/`should`.
///
/// Leaves with an empty field, or no non-empty operand where one is
/// required, are silently dropped so a partially-filled caller cannot
/// corrupt the expression. Sub-expressions never contribute to index
/// selection.
#[derive(Debug, Clone, Default)]
pub struct SubQuery {
    nodes: Vec<Node>,
}

impl SubQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The accumulated children, composed under the given operator.
    pub fn into_group(self, logical: LogicalOp) -> Group {
        Group {
            logical,
            children: self.nodes,
        }
    }

    fn push(mut self, field: &str, operator: Operator, values: Vec<String>) -> Self {
        if field.is_empty() {
            return self;
        }
        self.nodes
            .push(Node::Condition(Condition::new(field, operator, values)));
        self
    }

    fn push_one(self, field: &str, operator: Operator, value: &str) -> Self {
        if value.is_empty() {
            return self;
        }
        self.push(field, operator, vec![value.to_string()])
    }

    fn push_many(self, field: &str, operator: Operator, values: &[&str]) -> Self {
        if values.is_empty() {
            return self;
        }
        let values = values.iter().map(|v| v.to_string()).collect();
        self.push(field, operator, values)
    }

    pub fn eq(self, field: &str, value: &str) -> Self {
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

    pub fn in_(self, field: &str, values: &[&str]) -> Self {
        self.push_many(field, Operator::In, values)
    }

    pub fn not_in(self, field: &str, values: &[&str]) -> Self {
        self.push_many(field, Operator::NotIn, values)
    }

    pub fn like(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::Like, value)
    }

    pub fn left_like(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::LeftLike, value)
    }

    pub fn right_like(self, field: &str, value: &str) -> Self {
        self.push_one(field, Operator::RightLike, value)
    }

    pub fn exist(self, field: &str) -> Self {
        self.push(field, Operator::Exist, vec![])
    }

    pub fn not_exist(self, field: &str) -> Self {
        self.push(field, Operator::NotExist, vec![])
    }

    /// Nest another sub-expression under AND.
    pub fn must(mut self, sub: SubQuery) -> Self {
        if !sub.is_empty() {
            self.nodes.push(Node::Group(sub.into_group(LogicalOp::And)));
        }
        self
    }

    /// Nest another sub-expression under OR.
    pub fn should(mut self, sub: SubQuery) -> Self {
        if !sub.is_empty() {
            self.nodes.push(Node::Group(sub.into_group(LogicalOp::Or)));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_groups() {
        let sub = SubQuery::new()
            .gt("type", "0")
            .should(SubQuery::new().eq("color", "red").eq("color", "blue"));
        let group = sub.into_group(LogicalOp::And);
        assert_eq!(group.children.len(), 2);
        assert!(matches!(&group.children[1], Node::Group(g) if g.logical == LogicalOp::Or));
    }

    #[test]
    fn drops_empty_operands() {
        let sub = SubQuery::new()
            .eq("", "x")
            .eq("field", "")
            .in_("field", &[])
            .exist("");
        assert!(sub.is_empty());
    }

    #[test]
    fn empty_nested_sub_is_ignored() {
        let sub = SubQuery::new().eq("a", "1").must(SubQuery::new());
        let group = sub.into_group(LogicalOp::And);
        assert_eq!(group.children.len(), 1);
    }
}
