//! Path resolution and collection listings.

use crate::{log_collaborator_error, DEFAULT_MAX_ROWS};
use metabridge_query::{execute_query_all, make_query, Catalog, Column, Conditional};
use metabridge_types::{keys, Entity, MetaResult};
use serde_json::Value;
use tracing::debug;

/// Resolves `path` to the collection or data object it names.
pub fn resolve_path<C>(conn: &mut C, path: &str) -> MetaResult<Entity>
where
    C: Catalog + ?Sized,
{
    let entity = conn
        .resolve_path(path)
        .map_err(|err| log_collaborator_error("resolve path", err))?;
    debug!(path, kind = %entity.kind(), "resolved path");
    Ok(entity)
}

/// Lists an entity.
///
/// A data object lists as its own JSON form. A collection lists as an array
/// of the data objects directly inside it followed by its direct
/// sub-collections. Listings are never truncated.
pub fn list_path<C>(conn: &mut C, entity: &Entity) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    let entity = resolve_path(conn, &entity.path())?;
    list_resolved(conn, &entity)
}

/// [`list_path`] for an entity the catalog has already resolved.
pub(crate) fn list_resolved<C>(conn: &mut C, entity: &Entity) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    let Entity::Collection { path } = entity else {
        return Ok(entity.to_json());
    };

    let objects = make_query(DEFAULT_MAX_ROWS, &[Column::CollName, Column::DataName])
        .with_conditionals(&[Conditional::eq(Column::CollName, path.as_str())])?;
    let objects = execute_query_all(conn, objects, &[keys::COLLECTION, keys::DATA_OBJECT])?;

    let collections = make_query(DEFAULT_MAX_ROWS, &[Column::CollName])
        .with_conditionals(&[Conditional::eq(Column::CollParentName, path.as_str())])?;
    let collections = execute_query_all(conn, collections, &[keys::COLLECTION])?;

    let mut contents = into_array(objects);
    // The root collection is its own parent.
    contents.extend(into_array(collections).into_iter().filter(|c| {
        c.get(keys::COLLECTION).and_then(Value::as_str) != Some(path.as_str())
    }));
    debug!(path = %path, entries = contents.len(), "listed collection");
    Ok(Value::Array(contents))
}

pub(crate) fn into_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}
