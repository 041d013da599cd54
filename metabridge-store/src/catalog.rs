//! The SQLite catalog connection.

use crate::plan::{escape_like, plan_query, SqlPlan};
use crate::schema::{init_schema, KIND_COLLECTION, KIND_DATA_OBJECT};
use crate::{StoreError, StoreResult};
use metabridge_query::{Catalog, CatalogResult, Continuation, QueryInput, QueryPage};
use metabridge_types::{
    AccessLevel, Avu, Entity, MetadataOp, PermissionEntry, RecursiveOp, PATH_SEPARATOR,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Zone assigned to permission changes that do not name one.
pub const DEFAULT_ZONE: &str = "localZone";

/// A catalog connection backed by SQLite.
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Connection,
    zone: String,
    cursors: HashMap<u64, usize>,
    next_cursor: u64,
}

impl SqliteCatalog {
    /// Opens (or creates) a catalog at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens an in-memory catalog (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn,
            zone: DEFAULT_ZONE.to_string(),
            cursors: HashMap::new(),
            next_cursor: 1,
        })
    }

    /// Sets the zone used for permission changes without an explicit zone.
    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = zone.into();
        self
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Number of paged queries still holding a cursor.
    pub fn open_cursors(&self) -> usize {
        self.cursors.len()
    }

    // ── Population ───────────────────────────────────────────────

    /// Creates a collection and any missing ancestors.
    pub fn create_collection(&mut self, path: &str) -> StoreResult<()> {
        let path = normalize_path(path)?;
        let tx = self.conn.transaction()?;
        let mut ancestor = String::new();
        for component in path.split(PATH_SEPARATOR).filter(|c| !c.is_empty()) {
            let parent = if ancestor.is_empty() { "/".to_string() } else { ancestor.clone() };
            ancestor.push(PATH_SEPARATOR);
            ancestor.push_str(component);
            tx.execute(
                "INSERT OR IGNORE INTO entities (kind, coll_name, parent_name, data_name)
                 VALUES (?1, ?2, ?3, '')",
                params![KIND_COLLECTION, ancestor, parent],
            )?;
        }
        tx.commit()?;
        debug!(path = %path, "created collection");
        Ok(())
    }

    /// Creates an empty data object; its collection must already exist.
    pub fn create_data_object(&mut self, path: &str) -> StoreResult<()> {
        let path = normalize_path(path)?;
        if path == "/" {
            return Err(StoreError::InvalidArgument(
                "the root collection cannot be a data object".into(),
            ));
        }
        let entity = Entity::from_data_object_path(&path);
        let collection = entity.collection_name();
        let name = entity.data_object_name().unwrap_or_default();

        if self.find(KIND_COLLECTION, collection, "")?.is_none() {
            return Err(StoreError::NotFound(format!(
                "collection '{collection}' does not exist"
            )));
        }
        if self.find(KIND_COLLECTION, &path, "")?.is_some()
            || self.find(KIND_DATA_OBJECT, collection, name)?.is_some()
        {
            return Err(StoreError::AlreadyExists(format!("'{path}' already exists")));
        }

        self.conn.execute(
            "INSERT INTO entities (kind, coll_name, parent_name, data_name)
             VALUES (?1, ?2, ?3, ?4)",
            params![KIND_DATA_OBJECT, collection, parent_of(collection), name],
        )?;
        debug!(path = %path, "created data object");
        Ok(())
    }

    // ── Lookup ───────────────────────────────────────────────────

    fn find(&self, kind: &str, coll_name: &str, data_name: &str) -> StoreResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM entities WHERE kind = ?1 AND coll_name = ?2 AND data_name = ?3",
                params![kind, coll_name, data_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn entity_id(&self, entity: &Entity) -> StoreResult<i64> {
        let found = match entity {
            Entity::Collection { path } => {
                self.find(KIND_COLLECTION, &normalize_path(path)?, "")?
            }
            Entity::DataObject { collection, name } => {
                self.find(KIND_DATA_OBJECT, &normalize_path(collection)?, name)?
            }
        };
        found.ok_or_else(|| StoreError::NotFound(format!("'{entity}' does not exist")))
    }

    fn fetch_rows(&self, plan: &SqlPlan, width: usize) -> StoreResult<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(&plan.sql)?;
        let rows = stmt.query_map(params_from_iter(plan.params.iter()), |row| {
            (0..width)
                .map(|i| row.get::<_, String>(i))
                .collect::<rusqlite::Result<Vec<String>>>()
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }

    fn fetch_page(
        &mut self,
        query: &QueryInput,
        continuation: Option<Continuation>,
    ) -> StoreResult<QueryPage> {
        let offset = match continuation {
            None => 0,
            Some(c) => self.cursors.remove(&c.id()).ok_or_else(|| {
                StoreError::NotFound(format!("no open query with cursor {}", c.id()))
            })?,
        };

        let limit = query.max_rows();
        // One extra row tells us whether another page exists.
        let plan = plan_query(query, offset, limit + 1)?;
        let mut rows = self.fetch_rows(&plan, query.columns().len())?;

        let continuation = if rows.len() > limit {
            rows.truncate(limit);
            let id = self.next_cursor;
            self.next_cursor += 1;
            self.cursors.insert(id, offset + limit);
            Some(Continuation::new(id))
        } else {
            None
        };

        debug!(rows = rows.len(), offset, more = continuation.is_some(), "query page");
        Ok(QueryPage { rows, continuation })
    }

    fn modify_avu(&mut self, entity: &Entity, op: MetadataOp, avu: &Avu) -> StoreResult<()> {
        let id = self.entity_id(entity)?;
        match op {
            MetadataOp::Add => {
                let inserted = self.conn.execute(
                    "INSERT OR IGNORE INTO avus (entity_id, attr_name, attr_value, attr_units)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![id, avu.attribute, avu.value, avu.units_or_empty()],
                )?;
                if inserted == 0 {
                    return Err(StoreError::AlreadyExists(format!(
                        "AVU {avu} already exists on '{entity}'"
                    )));
                }
            }
            MetadataOp::Remove => {
                let removed = self.conn.execute(
                    "DELETE FROM avus
                     WHERE entity_id = ?1 AND attr_name = ?2 AND attr_value = ?3 AND attr_units = ?4",
                    params![id, avu.attribute, avu.value, avu.units_or_empty()],
                )?;
                if removed == 0 {
                    return Err(StoreError::NotFound(format!(
                        "AVU {avu} not found on '{entity}'"
                    )));
                }
            }
            MetadataOp::Query => {
                return Err(StoreError::InvalidArgument(
                    "metadata queries are run with execute_query".into(),
                ));
            }
        }
        debug!(path = %entity, op = %op, avu = %avu, "metadata applied");
        Ok(())
    }

    fn modify_access(
        &mut self,
        entity: &Entity,
        recurse: RecursiveOp,
        change: &PermissionEntry,
    ) -> StoreResult<()> {
        let id = self.entity_id(entity)?;
        let zone = change.zone.clone().unwrap_or_else(|| self.zone.clone());

        let tx = self.conn.transaction()?;
        let targets: Vec<i64> = match entity {
            Entity::Collection { path } if recurse.is_recursive() => {
                let path = normalize_path(path)?;
                let mut stmt = tx.prepare(
                    "SELECT id FROM entities WHERE coll_name = ?1 OR coll_name LIKE ?2 ESCAPE '\\'",
                )?;
                let ids = stmt
                    .query_map(params![path, descendant_pattern(&path)], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<i64>>>()?;
                ids
            }
            _ => vec![id],
        };

        for target in &targets {
            match change.level {
                AccessLevel::Null => {
                    tx.execute(
                        "DELETE FROM acls WHERE entity_id = ?1 AND user_name = ?2 AND user_zone = ?3",
                        params![target, change.owner, zone],
                    )?;
                }
                level => {
                    tx.execute(
                        "INSERT INTO acls (entity_id, user_name, user_zone, access_name)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(entity_id, user_name, user_zone)
                         DO UPDATE SET access_name = excluded.access_name",
                        params![target, change.owner, zone, level.native_name()],
                    )?;
                }
            }
        }
        tx.commit()?;

        debug!(
            path = %entity,
            owner = %change.owner,
            level = %change.level,
            entities = targets.len(),
            "permission applied"
        );
        Ok(())
    }
}

impl Catalog for SqliteCatalog {
    fn resolve_path(&mut self, path: &str) -> CatalogResult<Entity> {
        let path = normalize_path(path)?;
        if self.find(KIND_COLLECTION, &path, "")?.is_some() {
            return Ok(Entity::collection(path));
        }
        if path != "/" {
            let entity = Entity::from_data_object_path(&path);
            let name = entity.data_object_name().unwrap_or_default();
            if self
                .find(KIND_DATA_OBJECT, entity.collection_name(), name)?
                .is_some()
            {
                return Ok(entity);
            }
        }
        Err(StoreError::NotFound(format!("path '{path}' does not exist")).into())
    }

    fn execute_query(
        &mut self,
        query: &QueryInput,
        continuation: Option<Continuation>,
    ) -> CatalogResult<QueryPage> {
        Ok(self.fetch_page(query, continuation)?)
    }

    fn close_query(&mut self, continuation: Continuation) -> CatalogResult<()> {
        match self.cursors.remove(&continuation.id()) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!(
                "no open query with cursor {}",
                continuation.id()
            ))
            .into()),
        }
    }

    fn apply_metadata(&mut self, entity: &Entity, op: MetadataOp, avu: &Avu)
    -> CatalogResult<()> {
        Ok(self.modify_avu(entity, op, avu)?)
    }

    fn apply_permission(
        &mut self,
        entity: &Entity,
        recurse: RecursiveOp,
        change: &PermissionEntry,
    ) -> CatalogResult<()> {
        Ok(self.modify_access(entity, recurse, change)?)
    }
}

/// Validates an absolute path and strips trailing separators.
fn normalize_path(path: &str) -> StoreResult<String> {
    if !path.starts_with(PATH_SEPARATOR) {
        return Err(StoreError::InvalidArgument(format!(
            "path '{path}' is not absolute"
        )));
    }
    let trimmed = path.trim_end_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }
    let bad_component = trimmed
        .split(PATH_SEPARATOR)
        .skip(1)
        .any(|c| c.is_empty() || c == "." || c == "..");
    if bad_component {
        return Err(StoreError::InvalidArgument(format!(
            "path '{path}' is not in canonical form"
        )));
    }
    Ok(trimmed.to_string())
}

fn parent_of(path: &str) -> String {
    if path == "/" {
        return "/".to_string();
    }
    Entity::from_data_object_path(path)
        .collection_name()
        .to_string()
}

/// `LIKE` pattern matching everything below `path`.
fn descendant_pattern(path: &str) -> String {
    if path.ends_with(PATH_SEPARATOR) {
        format!("{}%", escape_like(path))
    } else {
        format!("{}/%", escape_like(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_separators() {
        assert_eq!(normalize_path("/a/b/").unwrap(), "/a/b");
        assert_eq!(normalize_path("///").unwrap(), "/");
        assert!(normalize_path("a/b").is_err());
        assert!(normalize_path("/a//b").is_err());
        assert!(normalize_path("/a/../b").is_err());
    }

    #[test]
    fn parent_paths() {
        assert_eq!(parent_of("/"), "/");
        assert_eq!(parent_of("/a"), "/");
        assert_eq!(parent_of("/a/b"), "/a");
    }

    #[test]
    fn descendant_patterns() {
        assert_eq!(descendant_pattern("/"), "/%");
        assert_eq!(descendant_pattern("/a_b"), "/a\\_b/%");
    }
}
