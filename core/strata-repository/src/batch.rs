use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strata_model::{DraftEntity, EntityId, Tag};

/// One operation inside a batch.
///
/// Serialized as `{"type": "upsert", "data": <draft>}` or
/// `{"type": "remove", "data": "<id>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum BatchItem {
    Upsert(DraftEntity),
    Remove(EntityId),
}

impl BatchItem {
    pub fn upsert(draft: DraftEntity) -> Self {
        BatchItem::Upsert(draft)
    }

    pub fn remove(id: impl Into<EntityId>) -> Self {
        BatchItem::Remove(id.into())
    }
}

/// An ordered list of batch operations.
pub type Batch = Vec<BatchItem>;

/// Outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Successful,
    Failed,
}

/// An id touched by a batch, with the tag of the backend that owns it
/// when the result comes from a federation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identified {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

impl Identified {
    pub fn new(id: EntityId) -> Self {
        Self { id, tag: None }
    }

    pub fn tagged(id: EntityId, tag: Tag) -> Self {
        Self { id, tag: Some(tag) }
    }
}

/// Result of a batch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    /// When the batch finished.
    pub time: DateTime<Utc>,
    pub upserted_ids: Vec<Identified>,
    pub removed_ids: Vec<Identified>,
    /// Tags whose sub-batch failed. Empty on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Tag>,
}

impl BatchResult {
    /// A successful result listing the affected ids.
    pub fn successful(upserted_ids: Vec<Identified>, removed_ids: Vec<Identified>) -> Self {
        Self {
            status: BatchStatus::Successful,
            time: Utc::now(),
            upserted_ids,
            removed_ids,
            failures: Vec::new(),
        }
    }

    /// A failed result naming the failing tags. Lists no ids.
    pub fn failed(failures: Vec<Tag>) -> Self {
        Self {
            status: BatchStatus::Failed,
            time: Utc::now(),
            upserted_ids: Vec::new(),
            removed_ids: Vec::new(),
            failures,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == BatchStatus::Successful
    }
}
