use serde::Serialize;

use crate::query::{FilterExpression, SortKey};

/// The assembled query descriptor.
///
/// Serializes to the target API's query grammar with absent parts omitted,
/// so a descriptor with nothing set becomes `{}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterExpression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
}
