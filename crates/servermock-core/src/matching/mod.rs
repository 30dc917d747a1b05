//! Request path matching utilities.

mod path;
mod query;

pub use path::{PathMatchResult, PathPattern, PatternError};
pub use query::parse_query_string;
