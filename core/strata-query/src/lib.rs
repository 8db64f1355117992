//! Structured queries for Strata repositories.
//!
//! - [`filter`]: the predicate tree ([`Where`]) and its operator set
//! - [`Sort`]: multi-key ordering rules
//! - [`Query`] / [`QueryBuilder`]: immutable query values and their fluent builder
//! - [`engine`]: evaluation of a query against an in-memory collection
//!
//! A [`Query`] is plain data: any backend may translate it to its native
//! query language, or hand it to [`engine::execute`] to run it in memory.

pub mod engine;
mod error;
pub mod filter;
mod query;
mod sort;

pub use engine::Page;
pub use error::{QueryError, QueryResult};
pub use filter::{Connective, Operator, Range, ValueShape, Where, WhereLeaf};
pub use query::{Query, QueryBuilder};
pub use sort::{Direction, Sort};
