use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use strata_model::{rebuild, DraftEntity, Entity, EntityId, EntityMeta, Props, Tag};

fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}

fn make_entity(data: Value) -> Entity {
    Entity {
        props: props(data),
        meta: EntityMeta {
            id: EntityId::from("user-1"),
            created_at: 1000,
            updated_at: 2000,
            idempotency_key: "key-1".to_string(),
            tag: Tag::from("user"),
            version: "v1".to_string(),
        },
    }
}

// ── Field resolution ─────────────────────────────────────────────

#[test]
fn field_reads_meta_bucket() {
    let e = make_entity(json!({"name": "Ana"}));
    assert_eq!(e.field("id"), Some(json!("user-1")));
    assert_eq!(e.field("created_at"), Some(json!(1000)));
    assert_eq!(e.field("updated_at"), Some(json!(2000)));
    assert_eq!(e.field("idempotency_key"), Some(json!("key-1")));
}

#[test]
fn field_reads_props_bucket() {
    let e = make_entity(json!({"name": "Ana", "tags": ["a", "b"]}));
    assert_eq!(e.field("name"), Some(json!("Ana")));
    assert_eq!(e.field("tags"), Some(json!(["a", "b"])));
}

#[test]
fn field_missing_is_none() {
    let e = make_entity(json!({"name": "Ana"}));
    assert_eq!(e.field("age"), None);
}

#[test]
fn meta_names_shadow_props() {
    let e = make_entity(json!({"id": "shadowed"}));
    assert_eq!(e.field("id"), Some(json!("user-1")));
}

// ── JSON pointer helpers ─────────────────────────────────────────

#[test]
fn pointer_helpers() {
    let e = make_entity(json!({
        "name": "Ana",
        "age": 31,
        "active": true,
        "address": {"city": "Porto"}
    }));
    assert_eq!(e.get_str("/name"), Some("Ana"));
    assert_eq!(e.get_number("/age"), Some(31.0));
    assert_eq!(e.get_bool("/active"), Some(true));
    assert_eq!(e.get_str("/address/city"), Some("Porto"));
    assert_eq!(e.get_str("/missing"), None);
    assert_eq!(e.get_str("name"), None);
}

// ── Drafts ───────────────────────────────────────────────────────

#[test]
fn new_draft_is_unidentified() {
    let draft = DraftEntity::new("order", "v1", props(json!({"value": 100})));
    assert!(!draft.is_identified());
    assert_eq!(draft.id(), None);
    assert_eq!(draft.tag(), &Tag::from("order"));
}

#[test]
fn entity_converts_to_identified_draft() {
    let e = make_entity(json!({"name": "Ana"}));
    let draft: DraftEntity = e.clone().into();
    assert!(draft.is_identified());
    assert_eq!(draft.id(), Some(e.id()));
    assert_eq!(draft.meta.created_at, Some(1000));
    assert_eq!(draft.meta.idempotency_key.as_deref(), Some("key-1"));
}

#[test]
fn with_id_and_key() {
    let draft = DraftEntity::new("order", "v1", Props::new())
        .with_id("order-9")
        .with_idempotency_key("k");
    assert_eq!(draft.id(), Some(&EntityId::from("order-9")));
    assert_eq!(draft.meta.idempotency_key.as_deref(), Some("k"));
    assert!(!draft.is_identified());
}

// ── Rebuild ──────────────────────────────────────────────────────

#[test]
fn rebuild_overrides_tag_and_version() {
    let e = make_entity(json!({"name": "Ana"}));
    let rebuilt = rebuild(Tag::from("admin"), "v2", e.props.clone(), e.meta.clone());
    assert_eq!(rebuilt.tag(), &Tag::from("admin"));
    assert_eq!(rebuilt.meta.version, "v2");
    assert_eq!(rebuilt.id(), e.id());
    assert_eq!(rebuilt.props, e.props);
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn entity_serde_shape() {
    let e = make_entity(json!({"name": "Ana"}));
    let value = serde_json::to_value(&e).unwrap();
    assert_eq!(value["meta"]["id"], "user-1");
    assert_eq!(value["meta"]["tag"], "user");
    assert_eq!(value["props"]["name"], "Ana");

    let back: Entity = serde_json::from_value(value).unwrap();
    assert_eq!(back, e);
}

#[test]
fn draft_omits_pending_meta() {
    let draft = DraftEntity::new("order", "v1", Props::new());
    let value = serde_json::to_value(&draft).unwrap();
    assert!(value["meta"].get("id").is_none());
    assert_eq!(value["meta"]["tag"], "order");
}

#[test]
fn generated_ids_are_unique() {
    assert_ne!(EntityId::new(), EntityId::new());
}
