use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operator::Operator;

/// A single leaf predicate over one document field.
///
/// `values` holds one operand for the scalar operators, the whole candidate
/// set for `In`/`NotIn`, and nothing for `Exist`/`NotExist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            values,
        }
    }

    /// First operand, empty for the existence operators.
    pub fn value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    fn joiner(self) -> &'static str {
        match self {
            LogicalOp::And => " && ",
            LogicalOp::Or => " || ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Condition(Condition),
    Group(Group),
}

/// A composed sub-expression: children joined under one logical operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub logical: LogicalOp,
    pub children: Vec<Node>,
}

// Rendering below follows the expression-language style the query layer
// reports from its explain hook, e.g. `(title == "hello") && (float(score) > 3.0)`.

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field;
        match self.operator {
            Operator::Eq => write!(f, "({field} == {:?})", self.value()),
            Operator::Ne => write!(f, "({field} != {:?})", self.value()),
            Operator::Gt => write!(f, "(float({field}) > {})", self.value()),
            Operator::Gte => write!(f, "(float({field}) >= {})", self.value()),
            Operator::Lt => write!(f, "(float({field}) < {})", self.value()),
            Operator::Lte => write!(f, "(float({field}) <= {})", self.value()),
            Operator::In => {
                let parts: Vec<String> = self
                    .values
                    .iter()
                    .map(|v| format!("({field} == {v:?})"))
                    .collect();
                write!(f, "({})", parts.join(" || "))
            }
            Operator::NotIn => {
                let parts: Vec<String> = self
                    .values
                    .iter()
                    .map(|v| format!("({field} != {v:?})"))
                    .collect();
                write!(f, "({})", parts.join(" && "))
            }
            Operator::Like => write!(f, "(indexOf({field}, {:?}) >= 0)", self.value()),
            Operator::LeftLike => write!(f, "(hasPrefix({field}, {:?}) == true)", self.value()),
            Operator::RightLike => write!(f, "(hasSuffix({field}, {:?}) == true)", self.value()),
            Operator::Exist => write!(f, "({field} != nil && len({field}) > 0)"),
            Operator::NotExist => write!(f, "({field} == nil || len({field}) <= 0)"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Condition(c) => fmt::Display::fmt(c, f),
            Node::Group(g) => fmt::Display::fmt(g, f),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.children.iter().map(|n| n.to_string()).collect();
        write!(f, "({})", parts.join(self.logical.joiner()))
    }
}

/// Render a top-level predicate list (implicit AND).
pub fn render(nodes: &[Node]) -> String {
    let parts: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
    parts.join(" && ")
}
