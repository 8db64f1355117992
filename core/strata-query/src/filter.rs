//! Filter algebra: predicate trees over entity fields.
//!
//! A [`Where`] is either a leaf condition (`field operator value`) or an
//! `and`/`or` composite of two subtrees. Trees are plain immutable values;
//! sharing a subtree between several queries is always safe.
//!
//! Field names are opaque strings at this layer. Nothing checks that a
//! field exists; a condition on an absent field simply fails to match
//! (see [`crate::engine::evaluate`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not-in")]
    NotIn,
    /// Inclusive on both ends.
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "array-contains")]
    ArrayContains,
    #[serde(rename = "array-contains-any")]
    ArrayContainsAny,
}

/// The shape an operator expects its comparison value to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A single value.
    Scalar,
    /// A JSON array of candidate values.
    Array,
    /// An object `{ "start": .., "end": .. }`.
    Range,
}

impl ValueShape {
    /// Returns true if `value` has this shape.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueShape::Scalar => !value.is_array(),
            ValueShape::Array => value.is_array(),
            ValueShape::Range => Range::from_value(value).is_some(),
        }
    }
}

impl Operator {
    /// All operators, in wire-name order.
    pub const ALL: [Operator; 11] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::ArrayContains,
        Operator::ArrayContainsAny,
    ];

    /// Returns the wire name (`"=="`, `"not-in"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "in",
            Operator::NotIn => "not-in",
            Operator::Between => "between",
            Operator::ArrayContains => "array-contains",
            Operator::ArrayContainsAny => "array-contains-any",
        }
    }

    /// Returns the value shape this operator compares against.
    pub fn expected_shape(self) -> ValueShape {
        match self {
            Operator::In | Operator::NotIn | Operator::ArrayContainsAny => ValueShape::Array,
            Operator::Between => ValueShape::Range,
            _ => ValueShape::Scalar,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operator: {s}"))
    }
}

/// Inclusive bounds for [`Operator::Between`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: Value,
    pub end: Value,
}

impl Range {
    pub fn new(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Reads a range out of its JSON form. Returns `None` for any other shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            start: obj.get("start")?.clone(),
            end: obj.get("end")?.clone(),
        })
    }

    /// Converts the range into its JSON form.
    pub fn into_value(self) -> Value {
        serde_json::json!({ "start": self.start, "end": self.end })
    }
}

/// Logical connective of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connective {
    And,
    Or,
}

/// A single condition applied to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereLeaf {
    pub fieldname: String,
    pub operator: Operator,
    pub value: Value,
}

impl WhereLeaf {
    /// True when `value` has the shape the operator expects.
    pub fn is_well_formed(&self) -> bool {
        self.operator.expected_shape().matches(&self.value)
    }
}

/// A predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Where {
    Composite {
        connective: Connective,
        left: Box<Where>,
        right: Box<Where>,
    },
    Leaf(WhereLeaf),
}

impl Where {
    /// Builds a leaf condition.
    pub fn leaf(fieldname: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Where::Leaf(WhereLeaf {
            fieldname: fieldname.into(),
            operator,
            value: value.into(),
        })
    }

    /// Builds an inclusive range condition.
    pub fn between(
        fieldname: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        Where::leaf(fieldname, Operator::Between, Range::new(start, end).into_value())
    }

    /// Both subtrees must hold.
    pub fn and(left: Where, right: Where) -> Self {
        Where::Composite {
            connective: Connective::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// At least one subtree must hold.
    pub fn or(left: Where, right: Where) -> Self {
        Where::Composite {
            connective: Connective::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Height of the tree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Where::Leaf(_) => 1,
            Where::Composite { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&WhereLeaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a WhereLeaf>) {
        match self {
            Where::Leaf(leaf) => out.push(leaf),
            Where::Composite { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

impl From<WhereLeaf> for Where {
    fn from(leaf: WhereLeaf) -> Self {
        Where::Leaf(leaf)
    }
}

/// Creates a leaf condition. Shorthand for [`Where::leaf`].
pub fn field(fieldname: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Where {
    Where::leaf(fieldname, operator, value)
}

/// Combines two filters with a logical AND.
pub fn and(left: Where, right: Where) -> Where {
    Where::and(left, right)
}

/// Combines two filters with a logical OR.
pub fn or(left: Where, right: Where) -> Where {
    Where::or(left, right)
}
