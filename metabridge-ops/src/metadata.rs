//! Listing and modifying AVUs on a single entity.

use crate::search::AvuCondition;
use crate::{log_collaborator_error, DEFAULT_MAX_ROWS};
use metabridge_query::{execute_query_all, make_query, Catalog, Column, Conditional, Operator};
use metabridge_types::{find_avu, keys, Avu, Entity, MetaError, MetaResult, MetadataOp};
use serde_json::Value;
use tracing::{debug, info};

/// Result of [`modify_metadata`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataOutcome {
    /// The AVU was added or removed.
    Applied,
    /// AVUs matched by a query, as a JSON array.
    Matched(Value),
}

/// Lists the AVUs on `entity`, optionally only those named `attribute`.
///
/// Returns a JSON array of AVU objects; `units` is omitted when empty.
pub fn list_metadata<C>(
    conn: &mut C,
    entity: &Entity,
    attribute: Option<&str>,
) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    let filter = attribute.map(|name| Conditional::eq(avu_columns(entity)[0], name));
    let avus = fetch_avus(conn, entity, filter.as_slice())?;
    Ok(avus_to_json(&avus))
}

/// Adds, removes or queries one AVU on `entity`.
///
/// Adding an AVU the entity already carries fails with `DuplicateAvu`
/// without changing anything; a missing unit and an empty unit count as the
/// same. A query matches on attribute and value, and on unit when one is
/// given.
pub fn modify_metadata<C>(
    conn: &mut C,
    entity: &Entity,
    op: MetadataOp,
    avu: &Avu,
) -> MetaResult<MetadataOutcome>
where
    C: Catalog + ?Sized,
{
    apply(conn, entity, op, &AvuCondition::new(avu.clone(), Operator::Equals))
}

/// As [`modify_metadata`], with the AVU given as JSON.
///
/// For queries the AVU may carry an `"operator"` used to compare values.
pub fn modify_json_metadata<C>(
    conn: &mut C,
    entity: &Entity,
    op: MetadataOp,
    avu: &Value,
) -> MetaResult<MetadataOutcome>
where
    C: Catalog + ?Sized,
{
    let condition = AvuCondition::from_json(avu)?;
    apply(conn, entity, op, &condition)
}

fn apply<C>(
    conn: &mut C,
    entity: &Entity,
    op: MetadataOp,
    condition: &AvuCondition,
) -> MetaResult<MetadataOutcome>
where
    C: Catalog + ?Sized,
{
    let avu = &condition.avu;
    match op {
        MetadataOp::Query => {
            let conds = condition.conditionals(avu_columns(entity));
            let avus = fetch_avus(conn, entity, &conds)?;
            return Ok(MetadataOutcome::Matched(avus_to_json(&avus)));
        }
        MetadataOp::Add => {
            let name = Conditional::eq(avu_columns(entity)[0], avu.attribute.as_str());
            let existing = fetch_avus(conn, entity, &[name])?;
            if let Some(found) = find_avu(&existing, avu) {
                debug!(path = %entity, avu = %found, "AVU already present");
                return Err(MetaError::DuplicateAvu {
                    path: entity.path(),
                    attribute: found.attribute.clone(),
                    value: found.value.clone(),
                    units: found.units_or_empty().to_string(),
                });
            }
        }
        MetadataOp::Remove => {}
    }

    conn.apply_metadata(entity, op, avu)
        .map_err(|err| log_collaborator_error("modify metadata", err))?;
    info!(path = %entity, op = %op, avu = %avu, "metadata modified");
    Ok(MetadataOutcome::Applied)
}

fn avu_columns(entity: &Entity) -> [Column; 3] {
    if entity.is_collection() {
        [
            Column::CollMetaAttrName,
            Column::CollMetaAttrValue,
            Column::CollMetaAttrUnits,
        ]
    } else {
        [
            Column::DataMetaAttrName,
            Column::DataMetaAttrValue,
            Column::DataMetaAttrUnits,
        ]
    }
}

/// AVUs on `entity` matching `extra`, in catalog order.
fn fetch_avus<C>(conn: &mut C, entity: &Entity, extra: &[Conditional]) -> MetaResult<Vec<Avu>>
where
    C: Catalog + ?Sized,
{
    let mut query = make_query(DEFAULT_MAX_ROWS, &avu_columns(entity));
    query.add_conditionals(&entity_conditionals(entity))?;
    query.add_conditionals(extra)?;

    let rows = execute_query_all(conn, query, &[keys::ATTRIBUTE, keys::VALUE, keys::UNITS])?;
    rows.as_array()
        .map(|rows| rows.iter().map(Avu::from_json).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}

pub(crate) fn entity_conditionals(entity: &Entity) -> Vec<Conditional> {
    let mut conds = vec![Conditional::eq(Column::CollName, entity.collection_name())];
    if let Some(name) = entity.data_object_name() {
        conds.push(Conditional::eq(Column::DataName, name));
    }
    conds
}

fn avus_to_json(avus: &[Avu]) -> Value {
    Value::Array(avus.iter().map(Avu::to_json).collect())
}
