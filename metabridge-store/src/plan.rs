//! Translation of generic queries into SQL.

use crate::schema::{KIND_COLLECTION, KIND_DATA_OBJECT};
use crate::{StoreError, StoreResult};
use metabridge_query::{Column, Operator, QueryInput};

/// A parameterised statement for one page of a query.
#[derive(Debug)]
pub(crate) struct SqlPlan {
    pub sql: String,
    pub params: Vec<String>,
}

/// Builds the `SELECT` for rows `offset..offset + limit` of `query`.
///
/// The query targets data objects if any selected or constrained column
/// belongs to data objects, and collections otherwise. Each attribute-name
/// conditional opens a new AVU join, and value or unit conditionals that
/// follow constrain that same AVU, so two AVU filters can match two
/// different AVUs on one entity.
pub(crate) fn plan_query(query: &QueryInput, offset: usize, limit: usize) -> StoreResult<SqlPlan> {
    let mut all_columns = query
        .columns()
        .iter()
        .chain(query.conditionals().iter().map(|c| &c.column));
    let data_domain = all_columns.clone().any(Column::is_data_object);
    let needs_acl = all_columns.clone().any(Column::is_access);

    if data_domain {
        if let Some(column) = all_columns.find(|c| is_collection_only(**c)) {
            return Err(StoreError::InvalidArgument(format!(
                "{column} cannot be combined with data object columns"
            )));
        }
    }

    let kind = if data_domain { KIND_DATA_OBJECT } else { KIND_COLLECTION };
    let mut params = vec![kind.to_string()];
    let mut predicates = vec!["e.kind = ?".to_string()];
    let mut meta_groups = 0usize;
    let mut current_group: Option<usize> = None;

    for cond in query.conditionals() {
        let expr = if cond.column.is_metadata() {
            let group = match current_group {
                Some(group) if !is_attribute_name(cond.column) => group,
                _ => {
                    meta_groups += 1;
                    current_group = Some(meta_groups - 1);
                    meta_groups - 1
                }
            };
            format!("m{group}.{}", metadata_field(cond.column))
        } else {
            column_expr(cond.column)
        };
        predicates.push(format!("{expr} {} ?", sql_operator(cond.operator)));
        params.push(cond.value.clone());
    }

    if let Some(zone) = query.zone_hint() {
        let root = format!("/{zone}");
        predicates.push("(e.coll_name = ? OR e.coll_name LIKE ? ESCAPE '\\')".to_string());
        params.push(root.clone());
        params.push(format!("{}/%", escape_like(&root)));
    }

    if meta_groups == 0 && query.columns().iter().any(Column::is_metadata) {
        meta_groups = 1;
    }

    let selected: Vec<String> = query
        .columns()
        .iter()
        .map(|column| {
            if column.is_metadata() {
                format!("m0.{}", metadata_field(*column))
            } else {
                column_expr(*column)
            }
        })
        .collect();

    let mut sql = format!("SELECT {} FROM entities e", selected.join(", "));
    for group in 0..meta_groups {
        sql.push_str(&format!(" JOIN avus m{group} ON m{group}.entity_id = e.id"));
    }
    if needs_acl {
        sql.push_str(" JOIN acls a ON a.entity_id = e.id");
    }

    let mut order = vec!["MIN(e.id)".to_string()];
    if meta_groups > 0 {
        order.push("MIN(m0.id)".to_string());
    }
    if needs_acl {
        order.push("MIN(a.id)".to_string());
    }

    sql.push_str(&format!(
        " WHERE {} GROUP BY {} ORDER BY {} LIMIT {limit} OFFSET {offset}",
        predicates.join(" AND "),
        selected.join(", "),
        order.join(", "),
    ));

    Ok(SqlPlan { sql, params })
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn is_attribute_name(column: Column) -> bool {
    matches!(column, Column::DataMetaAttrName | Column::CollMetaAttrName)
}

fn is_collection_only(column: Column) -> bool {
    matches!(
        column,
        Column::CollMetaAttrName
            | Column::CollMetaAttrValue
            | Column::CollMetaAttrUnits
            | Column::CollAccessName
    )
}

fn metadata_field(column: Column) -> &'static str {
    match column {
        Column::DataMetaAttrName | Column::CollMetaAttrName => "attr_name",
        Column::DataMetaAttrValue | Column::CollMetaAttrValue => "attr_value",
        _ => "attr_units",
    }
}

fn column_expr(column: Column) -> String {
    match column {
        Column::CollName => "e.coll_name".into(),
        Column::CollParentName => "e.parent_name".into(),
        Column::DataName => "e.data_name".into(),
        Column::UserName => "a.user_name".into(),
        Column::UserZone => "a.user_zone".into(),
        Column::DataAccessName | Column::CollAccessName => "a.access_name".into(),
        meta => format!("m0.{}", metadata_field(meta)),
    }
}

fn sql_operator(operator: Operator) -> &'static str {
    match operator {
        Operator::Equals => "=",
        Operator::NotEquals => "<>",
        Operator::LessThan => "<",
        Operator::GreaterThan => ">",
        Operator::LessOrEqual => "<=",
        Operator::GreaterOrEqual => ">=",
        Operator::Like => "LIKE",
        Operator::NotLike => "NOT LIKE",
    }
}
