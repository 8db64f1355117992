use crate::filter::{Operator, Where};
use crate::sort::Sort;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A structured query: filter, ordering and cursor pagination.
///
/// The default query matches everything, applies no ordering, starts at
/// the first page and is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Predicate tree; `None` matches every entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<Where>,
    /// Ordering rules, applied in sequence.
    #[serde(default)]
    pub order_by: Vec<Sort>,
    /// Page index as a decimal string; empty means the first page.
    #[serde(default)]
    pub cursor_ref: String,
    /// Page size; `None` (or zero) disables pagination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

impl Query {
    /// Starts a builder from the default query.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Returns the effective page size, if pagination applies.
    pub fn page_size(&self) -> Option<usize> {
        self.batch_size.filter(|n| *n > 0)
    }
}

/// Fluent, immutable query builder.
///
/// Every method borrows the builder and returns a new one; earlier
/// builders (and queries built from them) are never affected.
///
/// ```
/// use strata_query::{Operator, QueryBuilder, Sort};
///
/// let base = QueryBuilder::new().filter_where("value", Operator::Gt, 100);
/// let paged = base.order_by(vec![Sort::desc("value")]).limit(10);
///
/// assert!(base.build().order_by.is_empty());
/// assert_eq!(paged.build().batch_size, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a builder wrapping the default query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the filter with a complete tree.
    #[must_use]
    pub fn filter_by(&self, filter: Where) -> Self {
        self.with(|q| q.filter_by = Some(filter))
    }

    /// Replaces the filter with a single leaf condition.
    #[must_use]
    pub fn filter_where(
        &self,
        fieldname: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.filter_by(Where::leaf(fieldname, operator, value))
    }

    /// Replaces the sort list wholesale.
    #[must_use]
    pub fn order_by(&self, sorts: Vec<Sort>) -> Self {
        self.with(|q| q.order_by = sorts)
    }

    /// Sets the cursor reference.
    #[must_use]
    pub fn cursor(&self, cursor_ref: impl Into<String>) -> Self {
        let cursor_ref = cursor_ref.into();
        self.with(|q| q.cursor_ref = cursor_ref)
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(&self, batch_size: usize) -> Self {
        self.with(|q| q.batch_size = Some(batch_size))
    }

    /// Returns the query built so far.
    pub fn build(&self) -> Query {
        self.query.clone()
    }

    fn with(&self, change: impl FnOnce(&mut Query)) -> Self {
        let mut query = self.query.clone();
        change(&mut query);
        Self { query }
    }
}

impl From<QueryBuilder> for Query {
    fn from(builder: QueryBuilder) -> Self {
        builder.query
    }
}
