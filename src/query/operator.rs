use std::fmt;

use serde::{Serialize, Serializer};

/// Filter operator identifiers understood by the target record-query API.
///
/// `Raw` carries any spelling without a dedicated identifier, so operator
/// lookups are total and downstream code can still emit something instead
/// of aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Nin,
    Null,
    Nnull,
    Contains,
    Ncontains,
    StartsWith,
    EndsWith,
    Between,
    Nbetween,
    Empty,
    Nempty,
    Raw(String),
}

impl FilterOp {
    /// Maps a SQL operator spelling to its filter identifier.
    ///
    /// The lookup is case-insensitive. Unknown spellings come back verbatim
    /// as `Raw`, never as an error.
    pub fn from_sql(spelling: &str) -> FilterOp {
        match spelling.to_uppercase().as_str() {
            "=" => FilterOp::Eq,
            "!=" => FilterOp::Neq,
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Lte,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Gte,
            "IN" => FilterOp::In,
            "NOT IN" => FilterOp::Nin,
            "IS NULL" => FilterOp::Null,
            "IS NOT NULL" => FilterOp::Nnull,
            "LIKE" => FilterOp::Contains,
            _ => FilterOp::Raw(spelling.to_string()),
        }
    }

    /// The wire identifier, e.g. `_eq`. `Raw` yields its payload unchanged.
    pub fn as_str(&self) -> &str {
        match self {
            FilterOp::Eq => "_eq",
            FilterOp::Neq => "_neq",
            FilterOp::Lt => "_lt",
            FilterOp::Lte => "_lte",
            FilterOp::Gt => "_gt",
            FilterOp::Gte => "_gte",
            FilterOp::In => "_in",
            FilterOp::Nin => "_nin",
            FilterOp::Null => "_null",
            FilterOp::Nnull => "_nnull",
            FilterOp::Contains => "_contains",
            FilterOp::Ncontains => "_ncontains",
            FilterOp::StartsWith => "_starts_with",
            FilterOp::EndsWith => "_ends_with",
            FilterOp::Between => "_between",
            FilterOp::Nbetween => "_nbetween",
            FilterOp::Empty => "_empty",
            FilterOp::Nempty => "_nempty",
            FilterOp::Raw(spelling) => spelling,
        }
    }
}

impl From<&str> for FilterOp {
    fn from(id: &str) -> Self {
        match id {
            "_eq" => FilterOp::Eq,
            "_neq" => FilterOp::Neq,
            "_lt" => FilterOp::Lt,
            "_lte" => FilterOp::Lte,
            "_gt" => FilterOp::Gt,
            "_gte" => FilterOp::Gte,
            "_in" => FilterOp::In,
            "_nin" => FilterOp::Nin,
            "_null" => FilterOp::Null,
            "_nnull" => FilterOp::Nnull,
            "_contains" => FilterOp::Contains,
            "_ncontains" => FilterOp::Ncontains,
            "_starts_with" => FilterOp::StartsWith,
            "_ends_with" => FilterOp::EndsWith,
            "_between" => FilterOp::Between,
            "_nbetween" => FilterOp::Nbetween,
            "_empty" => FilterOp::Empty,
            "_nempty" => FilterOp::Nempty,
            other => FilterOp::Raw(other.to_string()),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for FilterOp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
