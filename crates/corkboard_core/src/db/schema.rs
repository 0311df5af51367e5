use rusqlite::Connection;

/// SQL schema for the board tables
const SCHEMA: &str = r#"
-- The bundled SQLite is compiled with SQLITE_DEFAULT_FOREIGN_KEYS=1;
-- pin the stock SQLite default so the items.container_id reference stays
-- informational (deleting a container does not cascade; see delete_container).
PRAGMA foreign_keys = OFF;

-- Containers table (board columns)
CREATE TABLE IF NOT EXISTS containers (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    position INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_containers_position ON containers(position);

-- Items table (entries within a container)
-- Deleting a container does not cascade; see delete_container.
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    position INTEGER NOT NULL,
    container_id TEXT NOT NULL REFERENCES containers(id),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_container ON items(container_id, position);
"#;

/// Initialize the database with the board schema
pub fn init_database(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
