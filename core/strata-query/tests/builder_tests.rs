use pretty_assertions::assert_eq;
use strata_query::{Operator, Query, QueryBuilder, Sort, Where};

#[test]
fn default_query_is_unbounded() {
    let q = QueryBuilder::new().build();
    assert_eq!(q, Query::default());
    assert_eq!(q.filter_by, None);
    assert!(q.order_by.is_empty());
    assert_eq!(q.cursor_ref, "");
    assert_eq!(q.page_size(), None);
}

#[test]
fn builder_steps_do_not_mutate_earlier_builders() {
    let base = QueryBuilder::new().filter_where("value", Operator::Gt, 100);
    let sorted = base.order_by(vec![Sort::asc("value")]);
    let paged = sorted.limit(5).cursor("2");

    assert!(base.build().order_by.is_empty());
    assert_eq!(base.build().batch_size, None);
    assert_eq!(sorted.build().batch_size, None);

    let q = paged.build();
    assert_eq!(q.filter_by, Some(Where::leaf("value", Operator::Gt, 100)));
    assert_eq!(q.order_by, vec![Sort::asc("value")]);
    assert_eq!(q.cursor_ref, "2");
    assert_eq!(q.batch_size, Some(5));
}

#[test]
fn order_by_replaces_previous_list() {
    let q = QueryBuilder::new()
        .order_by(vec![Sort::asc("a"), Sort::desc("b")])
        .order_by(vec![Sort::desc("c")])
        .build();
    assert_eq!(q.order_by, vec![Sort::desc("c")]);
}

#[test]
fn filter_replaces_previous_filter() {
    let q = QueryBuilder::new()
        .filter_where("a", Operator::Eq, 1)
        .filter_by(Where::leaf("b", Operator::Eq, 2))
        .build();
    assert_eq!(q.filter_by, Some(Where::leaf("b", Operator::Eq, 2)));
}

#[test]
fn zero_limit_disables_pagination() {
    let q = QueryBuilder::new().limit(0).build();
    assert_eq!(q.batch_size, Some(0));
    assert_eq!(q.page_size(), None);
}

#[test]
fn builder_converts_into_query() {
    let q: Query = QueryBuilder::new().limit(3).into();
    assert_eq!(q.page_size(), Some(3));
    assert_eq!(Query::builder().build(), Query::default());
}

#[test]
fn query_deserializes_with_defaults() {
    let q: Query = serde_json::from_str("{}").unwrap();
    assert_eq!(q, Query::default());
}
