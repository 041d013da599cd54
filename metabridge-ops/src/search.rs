//! Metadata search across collections and data objects.

use crate::listing::into_array;
use crate::DEFAULT_MAX_ROWS;
use metabridge_query::{
    execute_query, execute_query_filtered, is_within, make_query, scope_conditional, Catalog,
    Column, Conditional, Operator, QueryInput,
};
use metabridge_types::json::{as_object, optional_str, required_array};
use metabridge_types::{keys, Avu, MetaError, MetaResult, RecursiveOp, PATH_SEPARATOR};
use serde_json::Value;
use tracing::debug;

/// Limits applied to a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Most results per entity kind.
    pub max_rows: usize,
    /// Zone the catalog should answer from.
    pub zone: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            zone: None,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }
}

/// An AVU with the operator used to compare its value.
///
/// JSON form is an AVU with an optional `"operator"` key, `=` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvuCondition {
    pub avu: Avu,
    pub operator: Operator,
}

impl AvuCondition {
    pub fn new(avu: Avu, operator: Operator) -> Self {
        Self { avu, operator }
    }

    pub fn from_json(json: &Value) -> MetaResult<Self> {
        let avu = Avu::from_json(json)?;
        let operator = match optional_str(json, keys::OPERATOR)? {
            Some(op) => op.parse()?,
            None => Operator::Equals,
        };
        Ok(Self { avu, operator })
    }

    /// Conditionals on the given attribute, value and unit columns.
    ///
    /// The unit is only constrained when the AVU has one.
    pub(crate) fn conditionals(&self, columns: [Column; 3]) -> Vec<Conditional> {
        let [attribute, value, units] = columns;
        let mut conds = vec![
            Conditional::eq(attribute, self.avu.attribute.as_str()),
            Conditional::new(value, self.operator, self.avu.value.as_str()),
        ];
        if let Some(u) = self.avu.units() {
            conds.push(Conditional::eq(units, u));
        }
        conds
    }
}

const COLLECTION_AVU: [Column; 3] = [
    Column::CollMetaAttrName,
    Column::CollMetaAttrValue,
    Column::CollMetaAttrUnits,
];

const DATA_OBJECT_AVU: [Column; 3] = [
    Column::DataMetaAttrName,
    Column::DataMetaAttrValue,
    Column::DataMetaAttrUnits,
];

/// Finds the collections and data objects carrying every AVU in `query`.
///
/// `query` is `{"avus": [...], "collection"?: path}`. With a collection the
/// search covers it and everything below it; without one it covers the whole
/// namespace. Matching collections come first, then data objects, each in
/// the entity JSON form.
pub fn search_metadata<C>(
    conn: &mut C,
    query: &Value,
    options: &SearchOptions,
) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    as_object(query, "search query")?;
    let conditions = required_array(query, keys::AVUS)?
        .iter()
        .map(AvuCondition::from_json)
        .collect::<MetaResult<Vec<_>>>()?;
    if conditions.is_empty() {
        return Err(MetaError::InvalidType {
            field: keys::AVUS.to_string(),
            expected: "non-empty array",
        });
    }
    let root = optional_str(query, keys::COLLECTION)?.map(trim_collection);

    // Build both queries first so an oversized search fails before any
    // catalog call.
    let collections = build_query(
        options,
        &[Column::CollName],
        &conditions,
        COLLECTION_AVU,
        root,
    )?;
    let objects = build_query(
        options,
        &[Column::CollName, Column::DataName],
        &conditions,
        DATA_OBJECT_AVU,
        root,
    )?;

    let collections = run_scoped(conn, collections, &[keys::COLLECTION], root)?;
    let objects = run_scoped(conn, objects, &[keys::COLLECTION, keys::DATA_OBJECT], root)?;

    let results: Vec<Value> = into_array(collections)
        .into_iter()
        .chain(into_array(objects))
        .collect();

    debug!(
        avus = conditions.len(),
        root = root.unwrap_or("/"),
        results = results.len(),
        "metadata search complete"
    );
    Ok(Value::Array(results))
}

fn build_query(
    options: &SearchOptions,
    columns: &[Column],
    conditions: &[AvuCondition],
    avu_columns: [Column; 3],
    root: Option<&str>,
) -> MetaResult<QueryInput> {
    let mut query = make_query(options.max_rows, columns).with_zone_hint(options.zone.as_deref());
    for condition in conditions {
        query.add_conditionals(&condition.conditionals(avu_columns))?;
    }
    if let Some(root) = root {
        query.add_conditionals(&[scope_conditional(
            Column::CollName,
            root,
            RecursiveOp::Recurse,
        )])?;
    }
    Ok(query)
}

/// Runs a search query whose first column is the collection name.
///
/// The scope conditional is a prefix match, so rows outside `root` are
/// dropped while paging and never count towards the row cap.
fn run_scoped<C>(
    conn: &mut C,
    query: QueryInput,
    labels: &[&str],
    root: Option<&str>,
) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    match root {
        Some(root) => execute_query_filtered(conn, query, labels, |row| {
            row.first().is_some_and(|coll| is_within(coll, root))
        }),
        None => execute_query(conn, query, labels),
    }
}

fn trim_collection(path: &str) -> &str {
    let trimmed = path.trim_end_matches(PATH_SEPARATOR);
    if trimmed.is_empty() { path } else { trimmed }
}
