use crate::ids::{EntityId, Tag};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain fields of an entity. Backends store them opaquely.
pub type Props = serde_json::Map<String, Value>;

/// Field names resolved from [`EntityMeta`] rather than from [`Props`].
pub const META_FIELDS: [&str; 4] = ["id", "created_at", "updated_at", "idempotency_key"];

/// Identity and lifecycle metadata of a persisted entity.
///
/// `id` and `created_at` never change once assigned; `updated_at` moves
/// forward on every successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: EntityId,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub idempotency_key: String,
    pub tag: Tag,
    pub version: String,
}

/// Metadata of a draft: identity and timestamps may still be pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub tag: Tag,
    pub version: String,
}

/// An identified, immutable domain record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub props: Props,
    pub meta: EntityMeta,
}

impl Entity {
    /// Returns the entity id.
    pub fn id(&self) -> &EntityId {
        &self.meta.id
    }

    /// Returns the entity tag.
    pub fn tag(&self) -> &Tag {
        &self.meta.tag
    }

    /// Resolves a searchable field by name.
    ///
    /// `id`, `created_at`, `updated_at` and `idempotency_key` come from the
    /// metadata bucket; every other name is looked up in `props`. Returns
    /// `None` when the field is absent.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.meta.id.to_string())),
            "created_at" => Some(Value::from(self.meta.created_at)),
            "updated_at" => Some(Value::from(self.meta.updated_at)),
            "idempotency_key" => Some(Value::String(self.meta.idempotency_key.clone())),
            _ => self.props.get(name).cloned(),
        }
    }

    /// Extract a string value from `props` using a JSON pointer (e.g., "/name").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.props_pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a numeric value from `props` using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.props_pointer(pointer).and_then(|v| v.as_f64())
    }

    /// Extract a boolean value from `props` using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.props_pointer(pointer).and_then(|v| v.as_bool())
    }

    fn props_pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let value = self.props.get(head)?;
        if tail.is_empty() {
            Some(value)
        } else {
            value.pointer(tail)
        }
    }
}

/// A domain record whose identity may still be pending assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntity {
    pub props: Props,
    pub meta: DraftMeta,
}

impl DraftEntity {
    /// Creates an unidentified draft.
    pub fn new(tag: impl Into<Tag>, version: impl Into<String>, props: Props) -> Self {
        Self {
            props,
            meta: DraftMeta {
                id: None,
                created_at: None,
                updated_at: None,
                idempotency_key: None,
                tag: tag.into(),
                version: version.into(),
            },
        }
    }

    /// Returns a copy of this draft targeting an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.meta.id = Some(id.into());
        self
    }

    /// Returns a copy of this draft carrying an idempotency key.
    ///
    /// The key travels with the draft instead of living in shared state, so
    /// every lifecycle manager sees exactly the key of the call it serves.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.meta.idempotency_key = Some(key.into());
        self
    }

    /// Returns the draft tag.
    pub fn tag(&self) -> &Tag {
        &self.meta.tag
    }

    /// Returns the id, if one is already assigned.
    pub fn id(&self) -> Option<&EntityId> {
        self.meta.id.as_ref()
    }

    /// True when id and both timestamps are present.
    pub fn is_identified(&self) -> bool {
        self.meta.id.is_some() && self.meta.created_at.is_some() && self.meta.updated_at.is_some()
    }
}

impl From<EntityMeta> for DraftMeta {
    fn from(meta: EntityMeta) -> Self {
        Self {
            id: Some(meta.id),
            created_at: Some(meta.created_at),
            updated_at: Some(meta.updated_at),
            idempotency_key: Some(meta.idempotency_key),
            tag: meta.tag,
            version: meta.version,
        }
    }
}

impl From<Entity> for DraftEntity {
    fn from(entity: Entity) -> Self {
        Self {
            props: entity.props,
            meta: entity.meta.into(),
        }
    }
}

/// Rebuilds an entity from its parts.
///
/// `tag` and `version` override whatever the supplied meta carries, so a
/// lifecycle manager can stamp fresh metadata onto an existing kind.
pub fn rebuild(tag: Tag, version: impl Into<String>, props: Props, meta: EntityMeta) -> Entity {
    Entity {
        props,
        meta: EntityMeta {
            tag,
            version: version.into(),
            ..meta
        },
    }
}
