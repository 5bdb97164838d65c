pub mod token_source;
pub use token_source::*;

pub mod parse_issue;
pub use parse_issue::*;

pub mod where_parser;
pub use where_parser::*;

pub mod order_by_parser;
pub use order_by_parser::*;

pub mod limit_offset_parser;
pub use limit_offset_parser::*;

pub mod converter;
pub use converter::*;
