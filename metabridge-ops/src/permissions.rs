//! Listing and changing access-control entries.

use crate::metadata::entity_conditionals;
use crate::{log_collaborator_error, DEFAULT_MAX_ROWS};
use metabridge_query::{execute_query_all, make_query, Catalog, Column};
use metabridge_types::json::required_str;
use metabridge_types::{
    json_to_permission_change, keys, permissions_to_json, AccessLevel, Entity, MetaResult,
    PermissionEntry, RecursiveOp,
};
use serde_json::Value;
use tracing::info;

/// Lists the access-control entries on `entity` as
/// `[{"owner", "zone", "access_type"}, ...]`.
pub fn list_permissions<C>(conn: &mut C, entity: &Entity) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    let access = if entity.is_collection() {
        Column::CollAccessName
    } else {
        Column::DataAccessName
    };
    let query = make_query(DEFAULT_MAX_ROWS, &[Column::UserName, Column::UserZone, access])
        .with_conditionals(&entity_conditionals(entity))?;
    let rows = execute_query_all(conn, query, &[keys::OWNER, keys::ZONE, keys::ACCESS_TYPE])?;

    let mut entries = Vec::new();
    for row in rows.as_array().into_iter().flatten() {
        let level = AccessLevel::from_native(required_str(row, keys::ACCESS_TYPE)?)?;
        let entry = PermissionEntry::new(required_str(row, keys::OWNER)?, level)
            .with_zone(required_str(row, keys::ZONE)?);
        entries.push(entry);
    }
    Ok(permissions_to_json(&entries))
}

/// Grants `level` (a JSON level name) to `owner_specifier`, which is
/// `user` or `user#zone`.
pub fn modify_permissions<C>(
    conn: &mut C,
    entity: &Entity,
    recurse: RecursiveOp,
    owner_specifier: &str,
    level: &str,
) -> MetaResult<()>
where
    C: Catalog + ?Sized,
{
    let change = PermissionEntry::from_owner_specifier(owner_specifier, level)?;
    apply_permission_change(conn, entity, recurse, &change)
}

/// Applies a permission change given as `{"owner", "zone"?, "access_type"?}`.
pub fn modify_json_permissions<C>(
    conn: &mut C,
    entity: &Entity,
    recurse: RecursiveOp,
    permission: &Value,
) -> MetaResult<()>
where
    C: Catalog + ?Sized,
{
    let change = json_to_permission_change(permission)?;
    apply_permission_change(conn, entity, recurse, &change)
}

/// Asks the catalog to apply `change`.
///
/// With [`RecursiveOp::Recurse`] the catalog applies it below a collection
/// as well; whether that is atomic depends on the catalog.
pub fn apply_permission_change<C>(
    conn: &mut C,
    entity: &Entity,
    recurse: RecursiveOp,
    change: &PermissionEntry,
) -> MetaResult<()>
where
    C: Catalog + ?Sized,
{
    conn.apply_permission(entity, recurse, change)
        .map_err(|err| log_collaborator_error("modify permissions", err))?;
    info!(
        path = %entity,
        owner = %change.owner_specifier(),
        level = %change.level,
        recursive = recurse.is_recursive(),
        "permissions modified"
    );
    Ok(())
}
