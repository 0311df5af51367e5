//! Reorder batch wire types and pre-store validation.
//!
//! A batch describes, for a subset of containers, the complete new ordered
//! item list. Each `(item id, position)` pair also reassigns the item to
//! the enclosing container; cross-container drags are expressed this way,
//! there is no separate move operation. The batch is applied atomically by
//! [`crate::BoardRepo::apply_reorder`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};
use crate::id::is_valid_id;

/// A client-submitted description of new positions/owning containers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderBatch {
    pub containers: Vec<ReorderContainer>,
}

/// New complete item ordering for one container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderContainer {
    pub id: String,
    pub items: Vec<ReorderItem>,
}

/// New position for one item within the enclosing container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderItem {
    pub id: String,
    pub position: i64,
}

/// Validate a reorder batch before it touches the store.
///
/// A duplicate item id anywhere in the batch is treated as caller error and
/// rejected, rather than silently resolved last-applied-wins.
pub fn validate_batch(batch: &ReorderBatch) -> Result<()> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for container in &batch.containers {
        if !is_valid_id(&container.id) {
            errors.push(format!("invalid container id '{}'", container.id));
        }
        for item in &container.items {
            if !is_valid_id(&item.id) {
                errors.push(format!("invalid item id '{}'", item.id));
            }
            if !seen.insert(item.id.as_str()) {
                errors.push(format!("duplicate item id '{}' in batch", item.id));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BoardError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(containers: Vec<ReorderContainer>) -> ReorderBatch {
        ReorderBatch { containers }
    }

    #[test]
    fn test_valid_batch_passes() {
        let b = batch(vec![ReorderContainer {
            id: "cont1234".to_string(),
            items: vec![
                ReorderItem {
                    id: "item0001".to_string(),
                    position: 0,
                },
                ReorderItem {
                    id: "item0002".to_string(),
                    position: 1,
                },
            ],
        }]);
        assert!(validate_batch(&b).is_ok());
    }

    #[test]
    fn test_empty_batch_passes() {
        assert!(validate_batch(&batch(vec![])).is_ok());
    }

    #[test]
    fn test_duplicate_item_id_rejected() {
        // Same item listed in two containers
        let b = batch(vec![
            ReorderContainer {
                id: "cont0001".to_string(),
                items: vec![ReorderItem {
                    id: "item0001".to_string(),
                    position: 0,
                }],
            },
            ReorderContainer {
                id: "cont0002".to_string(),
                items: vec![ReorderItem {
                    id: "item0001".to_string(),
                    position: 0,
                }],
            },
        ]);
        let err = validate_batch(&b).unwrap_err();
        match err {
            BoardError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.contains("duplicate item id")));
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_ids_rejected() {
        let b = batch(vec![ReorderContainer {
            id: "x".to_string(),
            items: vec![ReorderItem {
                id: "way-too-long-id".to_string(),
                position: 0,
            }],
        }]);
        let err = validate_batch(&b).unwrap_err();
        match err {
            BoardError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_wire_shape() {
        let json = r#"{"containers":[{"id":"cont0001","items":[{"id":"item0001","position":3}]}]}"#;
        let b: ReorderBatch = serde_json::from_str(json).unwrap();
        assert_eq!(b.containers.len(), 1);
        assert_eq!(b.containers[0].items[0].position, 3);
    }
}
