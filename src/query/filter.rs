use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::query::FilterOp;

/// Logical connective of a filter group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    #[default]
    And,
    Or,
}

impl LogicOp {
    /// The wire key of the group, `_and` or `_or`.
    pub fn key(self) -> &'static str {
        match self {
            LogicOp::And => "_and",
            LogicOp::Or => "_or",
        }
    }
}

impl TryFrom<&str> for LogicOp {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "AND" => Ok(LogicOp::And),
            "OR" => Ok(LogicOp::Or),
            _ => Err(format!("Invalid logic operator: '{}'", value)),
        }
    }
}

/// A node of the filter tree: a single field comparison, or a group of
/// sub-expressions joined by one logical connective.
///
/// The tree serializes to the target API's filter grammar:
/// `{"field": {"_eq": value}}` for leaves, `{"_and": [...]}` and
/// `{"_or": [...]}` for groups. Builders and parsers never attach an empty
/// group and unwrap single-member groups, so neither shape reaches the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Comparison {
        field: String,
        operator: FilterOp,
        value: Value,
    },
    Group {
        logic: LogicOp,
        members: Vec<FilterExpression>,
    },
}

impl FilterExpression {
    pub fn comparison(field: &str, operator: FilterOp, value: Value) -> Self {
        Self::Comparison {
            field: field.to_string(),
            operator,
            value,
        }
    }

    pub fn group(logic: LogicOp, members: Vec<FilterExpression>) -> Self {
        Self::Group { logic, members }
    }
}

impl Serialize for FilterExpression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FilterExpression::Comparison {
                field,
                operator,
                value,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, &OperatorEntry { operator, value })?;
                map.end()
            }
            FilterExpression::Group { logic, members } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(logic.key(), members)?;
                map.end()
            }
        }
    }
}

// Inner single-entry map of a comparison leaf: {"_eq": value}.
struct OperatorEntry<'a> {
    operator: &'a FilterOp,
    value: &'a Value,
}

impl Serialize for OperatorEntry<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.operator.as_str(), self.value)?;
        map.end()
    }
}
