use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use strata_model::{DraftEntity, EntityId, Props, Tag};
use strata_query::{Operator, QueryBuilder, Sort};
use strata_repository::{
    BatchItem, BatchStatus, Batchable, Deletable, Described, IN_MEMORY_KIND, InMemoryConfig,
    InMemoryIdentityResolver, InMemoryRepository, Queryable, Readable, ReadonlyRepository,
    Repository, RepositoryError, Writable, WriteonlyRepository,
};

fn props(value: serde_json::Value) -> Props {
    value.as_object().cloned().unwrap_or_default()
}

fn order(value: i64) -> DraftEntity {
    DraftEntity::new("order", "v1", props(json!({ "value": value })))
}

fn repo() -> InMemoryRepository {
    InMemoryRepository::standalone(InMemoryConfig::new("order"))
}

// ── Description ──────────────────────────────────────────────────

#[test]
fn describes_itself() {
    let r = repo();
    assert_eq!(r.meta().resource, "repository");
    assert_eq!(r.meta().kind, IN_MEMORY_KIND);
    assert_eq!(r.tag(), &Tag::new("order"));
}

#[test]
fn default_config_uses_entity_tag() {
    let config = InMemoryConfig::default();
    assert_eq!(config.tag, Tag::new("entity"));
    assert!(config.seed.is_empty());
}

// ── get / set / remove ───────────────────────────────────────────

#[tokio::test]
async fn set_then_get_returns_identical_entity() {
    let r = repo();
    let saved = r.set(order(100)).await.unwrap();
    assert_eq!(saved.tag(), &Tag::new("order"));
    assert_eq!(saved.get_number("/value"), Some(100.0));

    let fetched = r.get(saved.id()).await.unwrap();
    assert_eq!(fetched, Some(saved));
}

#[tokio::test]
async fn get_unknown_id_is_none() {
    let r = repo();
    assert_eq!(r.get(&EntityId::from("nope")).await.unwrap(), None);
}

#[tokio::test]
async fn set_with_existing_id_replaces() {
    let r = repo();
    let first = r.set(order(1)).await.unwrap();

    let mut draft: DraftEntity = first.clone().into();
    draft.props.insert("value".into(), json!(2));
    let second = r.set(draft).await.unwrap();

    assert_eq!(second.id(), first.id());
    assert_eq!(second.meta.created_at, first.meta.created_at);
    assert!(second.meta.updated_at > first.meta.updated_at);
    assert_eq!(r.len().await, 1);
    assert_eq!(r.get(first.id()).await.unwrap(), Some(second));
}

#[tokio::test]
async fn update_by_bare_id_keeps_created_at() {
    let r = repo();
    let first = r.set(order(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = r.set(order(2).with_id(first.id().clone())).await.unwrap();

    assert_eq!(second.id(), first.id());
    assert_eq!(second.meta.created_at, first.meta.created_at);
    assert!(second.meta.updated_at > first.meta.updated_at);
    assert_eq!(r.len().await, 1);
}

#[tokio::test]
async fn back_to_back_updates_always_advance() {
    let r = repo();
    let mut last = r.set(order(0)).await.unwrap();
    for value in 1..5 {
        let next = r.set(order(value).with_id(last.id().clone())).await.unwrap();
        assert!(next.meta.updated_at > last.meta.updated_at);
        assert_eq!(next.meta.created_at, last.meta.created_at);
        last = next;
    }
}

#[tokio::test]
async fn remove_deletes_and_unknown_is_noop() {
    let r = repo();
    let saved = r.set(order(1)).await.unwrap();

    r.remove(&EntityId::from("nope")).await.unwrap();
    assert_eq!(r.len().await, 1);

    r.remove(saved.id()).await.unwrap();
    assert!(r.is_empty().await);
    assert_eq!(r.get(saved.id()).await.unwrap(), None);
}

#[tokio::test]
async fn empty_tag_is_rejected() {
    let r = repo();
    let err = r
        .set(DraftEntity::new("", "v1", Props::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidEntity(_)));
}

#[tokio::test]
async fn seed_is_visible() {
    let source = repo();
    let a = source.set(order(1)).await.unwrap();
    let b = source.set(order(2)).await.unwrap();

    let seeded = InMemoryRepository::standalone(
        InMemoryConfig::new("order").with_seed(vec![a.clone(), b.clone()]),
    );
    assert_eq!(seeded.snapshot().await, vec![a, b]);
}

// ── query ────────────────────────────────────────────────────────

#[tokio::test]
async fn query_filters_sorts_and_pages() {
    let r = repo();
    for v in [50, 300, 150, 200] {
        r.set(order(v)).await.unwrap();
    }

    let q = QueryBuilder::new()
        .filter_where("value", Operator::Gt, 100)
        .order_by(vec![Sort::desc("value")])
        .limit(2);

    let first = r.query(&q.build()).await.unwrap();
    let values: Vec<f64> = first.data.iter().filter_map(|e| e.get_number("/value")).collect();
    assert_eq!(values, vec![300.0, 200.0]);
    assert_eq!(first.next_cursor.as_deref(), Some("1"));

    let second = r.query(&q.cursor("1").build()).await.unwrap();
    let values: Vec<f64> = second.data.iter().filter_map(|e| e.get_number("/value")).collect();
    assert_eq!(values, vec![150.0]);
    assert_eq!(second.next_cursor, None);
}

#[tokio::test]
async fn query_invalid_cursor_is_error() {
    let r = repo();
    r.set(order(1)).await.unwrap();
    let q = QueryBuilder::new().limit(1).cursor("first").build();
    let err = r.query(&q).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Query(_)));
}

// ── batch ────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_applies_items_in_order() {
    let r = repo();
    let existing = r.set(order(1)).await.unwrap();

    let result = r
        .batch(vec![
            BatchItem::upsert(order(2)),
            BatchItem::remove(existing.id().clone()),
            BatchItem::upsert(order(3)),
        ])
        .await
        .unwrap();

    assert_eq!(result.status, BatchStatus::Successful);
    assert_eq!(result.upserted_ids.len(), 2);
    assert_eq!(result.removed_ids.len(), 1);
    assert_eq!(&result.removed_ids[0].id, existing.id());
    assert!(result.failures.is_empty());

    let values: Vec<f64> = r
        .snapshot()
        .await
        .iter()
        .filter_map(|e| e.get_number("/value"))
        .collect();
    assert_eq!(values, vec![2.0, 3.0]);
}

#[tokio::test]
async fn batch_remove_after_upsert_of_same_id_wins() {
    let r = repo();
    let draft = order(7).with_id("fixed");
    r.batch(vec![
        BatchItem::upsert(draft),
        BatchItem::remove("fixed"),
    ])
    .await
    .unwrap();
    assert!(r.is_empty().await);
}

#[tokio::test]
async fn batch_updates_keep_created_at() {
    let r = repo();
    let first = r.set(order(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let id = first.id().clone();
    r.batch(vec![
        BatchItem::upsert(order(2).with_id(id.clone())),
        BatchItem::upsert(order(3).with_id(id.clone())),
    ])
    .await
    .unwrap();

    let stored = r.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.meta.created_at, first.meta.created_at);
    assert!(stored.meta.updated_at > first.meta.updated_at + 1);
    assert_eq!(stored.get_number("/value"), Some(3.0));
}

#[tokio::test]
async fn batch_with_rejected_draft_stores_nothing() {
    let r = repo();
    let err = r
        .batch(vec![
            BatchItem::upsert(order(1)),
            BatchItem::upsert(DraftEntity::new("", "v1", Props::new())),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidEntity(_)));
    assert!(r.is_empty().await);
}

// ── Shared lifecycle / capability views ──────────────────────────

#[tokio::test]
async fn shared_resolver_records_owners() {
    use strata_repository::IdentityResolver;

    let resolver = Arc::new(InMemoryIdentityResolver::new());
    let r = InMemoryRepository::new(InMemoryConfig::new("order"), resolver.clone());
    let saved = r.set(order(1)).await.unwrap();

    let record = resolver.get_id_entity(saved.id()).await.unwrap().unwrap();
    assert_eq!(record.entity_tag, Tag::new("order"));
}

async fn count_all<R: ReadonlyRepository + ?Sized>(repo: &R) -> usize {
    repo.query(&Default::default()).await.unwrap().data.len()
}

async fn insert_one<R: WriteonlyRepository + ?Sized>(repo: &R) {
    repo.set(order(9)).await.unwrap();
}

#[tokio::test]
async fn capability_views_accept_full_repository() {
    let r: Arc<dyn Repository> = Arc::new(repo());
    insert_one(r.as_ref()).await;
    assert_eq!(count_all(r.as_ref()).await, 1);
}
