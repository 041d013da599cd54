//! Reassembles tabular query output into JSON.

use metabridge_types::{MetaError, MetaResult};
use serde_json::{Map, Value};
use tracing::error;

/// Builds one JSON object per row, keyed by `labels`, in row order.
///
/// A row whose width differs from `labels` means the catalog broke its
/// contract; this is reported as `InternalConsistencyFault`.
pub fn rows_to_json<R: AsRef<[String]>>(rows: &[R], labels: &[&str]) -> MetaResult<Value> {
    let mut objects = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != labels.len() {
            error!(
                target: "metabridge::consistency",
                row = index,
                values = row.len(),
                labels = labels.len(),
                "catalog returned a row of the wrong width"
            );
            return Err(MetaError::InternalConsistencyFault(format!(
                "row {index} has {} values for {} labels",
                row.len(),
                labels.len()
            )));
        }
        let object: Map<String, Value> = labels
            .iter()
            .zip(row)
            .map(|(label, value)| (label.to_string(), Value::String(value.clone())))
            .collect();
        objects.push(Value::Object(object));
    }
    Ok(Value::Array(objects))
}
