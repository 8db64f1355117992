//! In-memory query evaluation.
//!
//! Runs a [`Query`] against a materialized collection: filter, then a
//! stable multi-key sort, then cursor pagination.
//!
//! # Value semantics
//!
//! - Equality is structural; numbers compare by numeric value (`1 == 1.0`).
//! - Ordering is defined between two numbers, two strings or two booleans.
//!   Any other pair is incomparable and ordering operators yield `false`.
//!   Sorting ranks mixed kinds instead, so a missing sort key groups first
//!   in ascending order.
//! - An absent field never raises. It fails every condition except `!=`
//!   and `not-in`, which it satisfies.
//! - A leaf whose value has the wrong shape for its operator (a scalar for
//!   `in`, an array for `==`, ...) matches nothing.

use crate::error::{QueryError, QueryResult};
use crate::filter::{Connective, Operator, Range, Where, WhereLeaf};
use crate::query::Query;
use crate::sort::{Direction, Sort};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use strata_model::Entity;

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub data: Vec<Entity>,
    /// Cursor of the following page; `None` once the data is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn new(data: Vec<Entity>, next_cursor: Option<String>) -> Self {
        Self { data, next_cursor }
    }
}

/// Runs `query` over `entities`.
///
/// # Errors
///
/// Returns [`QueryError::InvalidCursor`] when pagination applies and the
/// cursor is neither empty nor a decimal page index.
pub fn execute<I>(query: &Query, entities: I) -> QueryResult<Page>
where
    I: IntoIterator<Item = Entity>,
{
    let mut matched: Vec<Entity> = entities
        .into_iter()
        .filter(|e| matches(query.filter_by.as_ref(), e))
        .collect();

    sort_entities(&mut matched, &query.order_by);
    paginate(matched, &query.cursor_ref, query.page_size())
}

/// True when `filter` is absent or evaluates to true for `entity`.
pub fn matches(filter: Option<&Where>, entity: &Entity) -> bool {
    filter.is_none_or(|w| evaluate(w, entity))
}

/// Evaluates a predicate tree against one entity.
pub fn evaluate(filter: &Where, entity: &Entity) -> bool {
    match filter {
        Where::Leaf(leaf) => evaluate_leaf(leaf, entity),
        Where::Composite {
            connective: Connective::And,
            left,
            right,
        } => evaluate(left, entity) && evaluate(right, entity),
        Where::Composite {
            connective: Connective::Or,
            left,
            right,
        } => evaluate(left, entity) || evaluate(right, entity),
    }
}

fn evaluate_leaf(leaf: &WhereLeaf, entity: &Entity) -> bool {
    if !leaf.is_well_formed() {
        return false;
    }

    let field = entity.field(&leaf.fieldname);
    let field = field.as_ref();
    let value = &leaf.value;

    match leaf.operator {
        Operator::Eq => field.is_some_and(|f| values_equal(f, value)),
        Operator::Ne => field.is_none_or(|f| !values_equal(f, value)),
        Operator::Gt => ordered(field, value, |o| o == Ordering::Greater),
        Operator::Gte => ordered(field, value, |o| o != Ordering::Less),
        Operator::Lt => ordered(field, value, |o| o == Ordering::Less),
        Operator::Lte => ordered(field, value, |o| o != Ordering::Greater),
        Operator::In => value
            .as_array()
            .is_some_and(|candidates| field.is_some_and(|f| contains(candidates, f))),
        Operator::NotIn => value
            .as_array()
            .is_some_and(|candidates| field.is_none_or(|f| !contains(candidates, f))),
        Operator::Between => match (field, Range::from_value(value)) {
            (Some(f), Some(range)) => {
                matches!(compare(&range.start, f), Some(Ordering::Less | Ordering::Equal))
                    && matches!(compare(f, &range.end), Some(Ordering::Less | Ordering::Equal))
            }
            _ => false,
        },
        Operator::ArrayContains => field
            .and_then(Value::as_array)
            .is_some_and(|items| contains(items, value)),
        Operator::ArrayContainsAny => match (field.and_then(Value::as_array), value.as_array()) {
            (Some(items), Some(candidates)) => items.iter().any(|item| contains(candidates, item)),
            _ => false,
        },
    }
}

fn ordered(field: Option<&Value>, value: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    field.and_then(|f| compare(f, value)).is_some_and(accept)
}

fn contains(items: &[Value], needle: &Value) -> bool {
    items.iter().any(|item| values_equal(item, needle))
}

/// Structural equality with numeric comparison for numbers.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Native ordering between two JSON values, when one exists.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Stable multi-key sort.
///
/// Rules are tried in order and the first non-equal key decides. Entities
/// equal on every key keep their relative order.
pub fn sort_entities(entities: &mut [Entity], sorts: &[Sort]) {
    if sorts.is_empty() {
        return;
    }
    entities.sort_by(|a, b| compare_by(a, b, sorts));
}

fn compare_by(a: &Entity, b: &Entity, sorts: &[Sort]) -> Ordering {
    for sort in sorts {
        let ordering = sort_order(
            a.field(&sort.property).as_ref(),
            b.field(&sort.property).as_ref(),
        );
        let ordering = match sort.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// Sort keys need a total order. Values of the same kind use native
// ordering; different kinds are ranked absent < null < bool < number <
// string < array/object, and arrays/objects tie with each other.
fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => compare(x, y).unwrap_or_else(|| kind_rank(a).cmp(&kind_rank(b))),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_) | Value::Object(_)) => 5,
    }
}

/// Parses a cursor into a page index. The empty cursor is page 0.
///
/// # Errors
///
/// Returns [`QueryError::InvalidCursor`] for anything but a decimal index.
pub fn parse_cursor(cursor_ref: &str) -> QueryResult<usize> {
    if cursor_ref.is_empty() {
        return Ok(0);
    }
    cursor_ref
        .parse::<usize>()
        .map_err(|_| QueryError::InvalidCursor(cursor_ref.to_string()))
}

/// Cuts one page out of an already filtered and sorted result set.
///
/// Requests `n + 1` items starting at `page * n`; a full `n + 1` means
/// another page exists, so the extra item is dropped and `next_cursor` is
/// set. With no page size everything is returned and no cursor is emitted.
///
/// # Errors
///
/// Returns [`QueryError::InvalidCursor`] when the cursor does not parse.
pub fn paginate(
    entities: Vec<Entity>,
    cursor_ref: &str,
    batch_size: Option<usize>,
) -> QueryResult<Page> {
    let Some(size) = batch_size.filter(|n| *n > 0) else {
        return Ok(Page::new(entities, None));
    };

    let page = parse_cursor(cursor_ref)?;
    let start = page.saturating_mul(size);
    // one extra item tells whether another page follows
    let want = size.saturating_add(1);
    let mut data: Vec<Entity> = entities.into_iter().skip(start).take(want).collect();

    let next_cursor = if size < usize::MAX && data.len() == want {
        data.truncate(size);
        Some((page + 1).to_string())
    } else {
        None
    };

    Ok(Page::new(data, next_cursor))
}
