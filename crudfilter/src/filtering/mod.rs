//! # Query Filtering
//!
//! Raw request parameters become a [`ComposedQuery`] here, and a composed query
//! becomes SQL conditions for the record store.
//!
//! ## Parameters
//!
//! ```text
//! ?status=active              exact match on a searchable field
//! ?age_gte=18&age_lt=65       operator suffixes (see [`operators::OPERATORS`])
//! ?role_in=admin,editor       comma-separated lists for `_in` / `_notIn`
//! ?deleted_at_isNull=1        value ignored
//! ?sort=name:asc,age:desc     ordering, first entry is the primary key
//! ?contain=posts.comments     eager loading, dotted paths nest
//! ?count=posts                attach `posts_count`
//! ?limit=10&page=2            pagination (see [`pagination`])
//! ```
//!
//! A field is searchable when it is writable, the primary key or a timestamp column.
//! Everything else is ignored without error.

pub mod conditions;
pub mod operators;
pub mod pagination;
pub mod query;
pub mod sort;
pub mod translator;

pub use conditions::build_condition;
pub use pagination::{DEFAULT_LIMIT, MAX_WINDOW, Page, PageRequest, QuerySettings, calculate_content_range};
pub use query::{Comparison, ComposedQuery, Predicate, SortClause};
pub use sort::parse_sort_param;
pub use translator::QueryFilterTranslator;
