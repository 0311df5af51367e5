use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered group of items (a board column)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Board-level ordering key; ascending, gaps permitted
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

/// A single ordered entry owned by exactly one container at a time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    /// Ordering key within the owning container
    pub position: i64,
    pub container_id: String,
    pub created_at: DateTime<Utc>,
}

/// A container together with its items, both in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerWithItems {
    #[serde(flatten)]
    pub container: Container,
    pub items: Vec<Item>,
}

/// The complete, consistently-read board state sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub containers: Vec<ContainerWithItems>,
}

/// Partial update for a container; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i64>,
}

/// Partial update for an item; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub title: Option<String>,
    pub position: Option<i64>,
    pub container_id: Option<String>,
}
