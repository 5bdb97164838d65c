pub mod operator;
pub use operator::*;

pub mod filter;
pub use filter::*;

pub mod sort_key;
pub use sort_key::*;

pub mod query;
pub use query::*;

pub mod builder;
pub use builder::*;
