//! Query builder that receives authorized filters.

mod select;
mod types;

pub use select::{QueryBuilder, select};
pub use types::{QueryResult, SortDir, SortField};
