use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::{BoardError, Result};
use crate::id::mint_id;
use crate::model::{Container, ContainerPatch, ContainerWithItems, Item, ItemPatch, Snapshot};
use crate::reorder::ReorderBatch;

/// Board repository for database operations.
///
/// The connection mutex serializes store operations, so position assignment
/// on create (max + 1 within the scope) is race-free: two concurrent creates
/// in the same scope can never observe the same maximum.
#[derive(Clone)]
pub struct BoardRepo {
    conn: Arc<Mutex<Connection>>,
}

impl BoardRepo {
    /// Create a new BoardRepo with the given connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    // ===== Reads =====

    /// All containers with their items, both levels in display order
    pub fn list_containers_with_items(&self) -> Result<Vec<ContainerWithItems>> {
        let conn = self.conn.lock().unwrap();
        read_board(&conn)
    }

    /// The complete board state, read under a single lock so it never
    /// reflects a half-applied reorder
    pub fn snapshot(&self) -> Result<Snapshot> {
        let conn = self.conn.lock().unwrap();
        Ok(Snapshot {
            containers: read_board(&conn)?,
        })
    }

    /// Get one container with its items
    pub fn get_container(&self, id: &str) -> Result<Option<ContainerWithItems>> {
        let conn = self.conn.lock().unwrap();

        let container = conn
            .query_row(
                "SELECT id, title, description, position, created_at
                 FROM containers WHERE id = ?",
                [id],
                row_to_container,
            )
            .optional()?;

        let Some(container) = container else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT id, title, position, container_id, created_at
             FROM items WHERE container_id = ?
             ORDER BY position, created_at, id",
        )?;
        let items = stmt
            .query_map([id], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(ContainerWithItems { container, items }))
    }

    // ===== Container writes =====

    /// Create a container appended after the current end of the board
    pub fn create_container(&self, title: &str, description: Option<&str>) -> Result<Container> {
        let conn = self.conn.lock().unwrap();

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM containers",
            [],
            |row| row.get(0),
        )?;

        let id = mint_id();
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO containers (id, title, description, position, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![id, title, description, position, now],
        )?;

        debug!("Created container {} at position {}", id, position);

        Ok(Container {
            id,
            title: title.to_string(),
            description: description.map(|s| s.to_string()),
            position,
            created_at: timestamp_to_datetime(now),
        })
    }

    /// Update a container; omitted patch fields are left unchanged
    pub fn update_container(&self, id: &str, patch: &ContainerPatch) -> Result<Container> {
        let conn = self.conn.lock().unwrap();

        let existing = conn
            .query_row(
                "SELECT id, title, description, position, created_at
                 FROM containers WHERE id = ?",
                [id],
                row_to_container,
            )
            .optional()?;

        let Some(mut container) = existing else {
            return Err(BoardError::not_found("container", id));
        };

        if let Some(title) = &patch.title {
            container.title = title.clone();
        }
        if let Some(description) = &patch.description {
            container.description = Some(description.clone());
        }
        if let Some(position) = patch.position {
            container.position = position;
        }

        conn.execute(
            "UPDATE containers SET title = ?, description = ?, position = ? WHERE id = ?",
            params![
                container.title,
                container.description,
                container.position,
                id
            ],
        )?;

        Ok(container)
    }

    /// Delete a container.
    ///
    /// Items keep their `container_id` and simply stop appearing in
    /// snapshots; there is no cascade.
    pub fn delete_container(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM containers WHERE id = ?", [id])?;
        if deleted == 0 {
            return Err(BoardError::not_found("container", id));
        }
        Ok(())
    }

    // ===== Item writes =====

    /// Create an item appended after the current end of its container
    pub fn create_item(&self, container_id: &str, title: &str) -> Result<Item> {
        let conn = self.conn.lock().unwrap();

        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM containers WHERE id = ?",
                [container_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(BoardError::not_found("container", container_id));
        }

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM items WHERE container_id = ?",
            [container_id],
            |row| row.get(0),
        )?;

        let id = mint_id();
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO items (id, title, position, container_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![id, title, position, container_id, now],
        )?;

        debug!(
            "Created item {} in container {} at position {}",
            id, container_id, position
        );

        Ok(Item {
            id,
            title: title.to_string(),
            position,
            container_id: container_id.to_string(),
            created_at: timestamp_to_datetime(now),
        })
    }

    /// Update an item; a new `container_id` must reference an existing
    /// container
    pub fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<Item> {
        let conn = self.conn.lock().unwrap();

        let existing = conn
            .query_row(
                "SELECT id, title, position, container_id, created_at
                 FROM items WHERE id = ?",
                [id],
                row_to_item,
            )
            .optional()?;

        let Some(mut item) = existing else {
            return Err(BoardError::not_found("item", id));
        };

        if let Some(container_id) = &patch.container_id {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM containers WHERE id = ?",
                    [container_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(BoardError::not_found("container", container_id));
            }
            item.container_id = container_id.clone();
        }
        if let Some(title) = &patch.title {
            item.title = title.clone();
        }
        if let Some(position) = patch.position {
            item.position = position;
        }

        conn.execute(
            "UPDATE items SET title = ?, position = ?, container_id = ? WHERE id = ?",
            params![item.title, item.position, item.container_id, id],
        )?;

        Ok(item)
    }

    /// Delete an item; sibling positions are left untouched
    pub fn delete_item(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM items WHERE id = ?", [id])?;
        if deleted == 0 {
            return Err(BoardError::not_found("item", id));
        }
        Ok(())
    }

    // ===== Reorder transaction engine =====

    /// Apply a reorder batch as a single all-or-nothing transaction.
    ///
    /// Every `(item id, position)` pair sets the item's position and
    /// reassigns it to the enclosing container. If any referenced item or
    /// target container does not exist the transaction rolls back and
    /// nothing is persisted. Reapplying the same batch is a no-op on the
    /// final state.
    pub fn apply_reorder(&self, batch: &ReorderBatch) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        for container in &batch.containers {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM containers WHERE id = ?",
                    [container.id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(BoardError::not_found("container", &container.id));
            }

            for item in &container.items {
                let updated = tx.execute(
                    "UPDATE items SET container_id = ?, position = ? WHERE id = ?",
                    params![container.id, item.position, item.id],
                )?;
                if updated == 0 {
                    // Dropping the transaction rolls back everything applied
                    // so far; partial reorders are never visible.
                    return Err(BoardError::not_found("item", &item.id));
                }
            }
        }

        let total_items: usize = batch.containers.iter().map(|c| c.items.len()).sum();
        tx.commit()?;

        debug!(
            "Applied reorder batch: {} containers, {} items",
            batch.containers.len(),
            total_items
        );

        Ok(())
    }
}

// ===== Helper functions =====

/// Read the whole board in display order under an already-held lock
fn read_board(conn: &Connection) -> Result<Vec<ContainerWithItems>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, position, created_at
         FROM containers ORDER BY position, created_at, id",
    )?;
    let containers = stmt
        .query_map([], row_to_container)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, title, position, container_id, created_at
         FROM items ORDER BY position, created_at, id",
    )?;
    let mut items_by_container: HashMap<String, Vec<Item>> = HashMap::new();
    for item in stmt.query_map([], row_to_item)? {
        let item = item?;
        items_by_container
            .entry(item.container_id.clone())
            .or_default()
            .push(item);
    }

    Ok(containers
        .into_iter()
        .map(|container| {
            let items = items_by_container
                .remove(&container.id)
                .unwrap_or_default();
            ContainerWithItems { container, items }
        })
        .collect())
}

fn row_to_container(row: &rusqlite::Row<'_>) -> rusqlite::Result<Container> {
    Ok(Container {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        position: row.get(3)?,
        created_at: timestamp_to_datetime(row.get(4)?),
    })
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        title: row.get(1)?,
        position: row.get(2)?,
        container_id: row.get(3)?,
        created_at: timestamp_to_datetime(row.get(4)?),
    })
}

/// Convert Unix timestamp to DateTime<Utc>
fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now)
}
