pub mod parser;
pub use parser::SqlConverter;

pub mod query;
pub use query::{FilterExpression, FilterOp, LogicOp, Query, QueryBuilder, SortKey};
