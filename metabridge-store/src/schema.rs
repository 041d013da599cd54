use crate::StoreResult;
use rusqlite::Connection;

pub(crate) const KIND_COLLECTION: &str = "c";
pub(crate) const KIND_DATA_OBJECT: &str = "d";

/// Creates the catalog tables and the root collection.
pub(crate) fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA case_sensitive_like = ON;

        CREATE TABLE IF NOT EXISTS entities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL CHECK (kind IN ('c', 'd')),
            coll_name TEXT NOT NULL,
            parent_name TEXT NOT NULL,
            data_name TEXT NOT NULL DEFAULT '',
            UNIQUE(kind, coll_name, data_name)
        );

        CREATE TABLE IF NOT EXISTS avus (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            attr_name TEXT NOT NULL,
            attr_value TEXT NOT NULL,
            attr_units TEXT NOT NULL DEFAULT '',
            UNIQUE(entity_id, attr_name, attr_value, attr_units)
        );

        CREATE TABLE IF NOT EXISTS acls (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            user_name TEXT NOT NULL,
            user_zone TEXT NOT NULL,
            access_name TEXT NOT NULL,
            UNIQUE(entity_id, user_name, user_zone)
        );

        CREATE INDEX IF NOT EXISTS idx_entities_coll ON entities(coll_name);
        CREATE INDEX IF NOT EXISTS idx_avus_attr ON avus(attr_name);

        INSERT OR IGNORE INTO entities (kind, coll_name, parent_name, data_name)
            VALUES ('c', '/', '/', '');
        ",
    )?;
    Ok(())
}
