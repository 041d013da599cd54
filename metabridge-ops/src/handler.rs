//! JSON request handling.
//!
//! A request is one JSON object. On success the response is the request
//! with the result attached under a result key (`contents`, `avus`,
//! `access`), or for a search the array of matches. On failure the response
//! is the request with an `"error"` object added and no result key, so a
//! caller never sees a payload and an error together.

use crate::listing::list_resolved;
use crate::{
    apply_permission_change, list_metadata, list_permissions, modify_json_metadata, resolve_path,
    search_metadata, AvuCondition, MetadataOutcome, SearchOptions,
};
use metabridge_query::Catalog;
use metabridge_types::json::required_array;
use metabridge_types::{
    json_to_permission_change, keys, Entity, ErrorRecord, MetaError, MetaResult, MetadataOp,
    RecursiveOp,
};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

/// What to do with each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// List an entity, with its AVUs and access-control entries if asked.
    List { avus: bool, access: bool },
    /// List AVUs, optionally only those with the given attribute name.
    ListMetadata { attribute: Option<String> },
    /// Apply each AVU in the request's `"avus"` array.
    ModifyMetadata(MetadataOp),
    /// Apply each entry in the request's `"access"` array.
    ModifyPermissions(RecursiveOp),
    /// Run the request as a metadata search.
    Search(SearchOptions),
}

impl Action {
    /// Keys this action adds to a successful response.
    fn result_keys(&self) -> &'static [&'static str] {
        match self {
            Self::List { .. } => &[keys::CONTENTS, keys::AVUS, keys::ACCESS],
            Self::ListMetadata { .. } => &[keys::AVUS],
            Self::ModifyMetadata(MetadataOp::Query) => &[keys::AVUS],
            Self::ModifyMetadata(_) | Self::ModifyPermissions(_) | Self::Search(_) => &[],
        }
    }
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub json: Value,
    pub error: Option<ErrorRecord>,
}

impl Response {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Runs `action` for `request` and builds the response.
pub fn handle_request<C>(conn: &mut C, action: &Action, request: Value) -> Response
where
    C: Catalog + ?Sized,
{
    match run(conn, action, &request) {
        Ok(json) => Response { json, error: None },
        Err(err) => {
            report(&err);
            let mut json = request;
            if let Some(object) = json.as_object_mut() {
                for key in action.result_keys() {
                    object.remove(*key);
                }
            }
            let record = ErrorRecord::from(&err);
            Response {
                json: error_envelope(json, &record),
                error: Some(record),
            }
        }
    }
}

/// Embeds `record` under `"error"` in `target`, or in a new object when
/// `target` is not an object.
pub fn error_envelope(target: Value, record: &ErrorRecord) -> Value {
    let mut object = match target {
        Value::Object(object) => object,
        _ => Map::new(),
    };
    object.insert(keys::ERROR.to_string(), record.to_json());
    Value::Object(object)
}

fn run<C>(conn: &mut C, action: &Action, request: &Value) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    match action {
        Action::Search(options) => search_metadata(conn, request, options),
        Action::List { avus, access } => {
            let entity = resolve(conn, request)?;
            let mut response = entity.to_json();
            if entity.is_collection() {
                attach(&mut response, keys::CONTENTS, list_resolved(conn, &entity)?)?;
            }
            if *avus {
                attach(&mut response, keys::AVUS, list_metadata(conn, &entity, None)?)?;
            }
            if *access {
                attach(&mut response, keys::ACCESS, list_permissions(conn, &entity)?)?;
            }
            Ok(response)
        }
        Action::ListMetadata { attribute } => {
            let entity = resolve(conn, request)?;
            let avus = list_metadata(conn, &entity, attribute.as_deref())?;
            let mut response = request.clone();
            attach(&mut response, keys::AVUS, avus)?;
            Ok(response)
        }
        Action::ModifyMetadata(op) => {
            Entity::from_json(request)?;
            let avus = required_array(request, keys::AVUS)?;
            for avu in avus {
                AvuCondition::from_json(avu)?;
            }
            let entity = resolve(conn, request)?;

            let mut matched = Vec::new();
            for avu in avus {
                if let MetadataOutcome::Matched(found) =
                    modify_json_metadata(conn, &entity, *op, avu)?
                {
                    matched.extend(found.as_array().into_iter().flatten().cloned());
                }
            }
            let mut response = request.clone();
            if *op == MetadataOp::Query {
                attach(&mut response, keys::AVUS, Value::Array(matched))?;
            }
            Ok(response)
        }
        Action::ModifyPermissions(recurse) => {
            Entity::from_json(request)?;
            let changes = required_array(request, keys::ACCESS)?
                .iter()
                .map(json_to_permission_change)
                .collect::<MetaResult<Vec<_>>>()?;
            let entity = resolve(conn, request)?;
            for change in &changes {
                apply_permission_change(conn, &entity, *recurse, change)?;
            }
            Ok(request.clone())
        }
    }
}

/// Parses the request's entity and looks it up in the catalog.
fn resolve<C>(conn: &mut C, request: &Value) -> MetaResult<Entity>
where
    C: Catalog + ?Sized,
{
    let entity = Entity::from_json(request)?;
    resolve_path(conn, &entity.path())
}

fn attach(target: &mut Value, key: &str, value: Value) -> MetaResult<()> {
    let object = target.as_object_mut().ok_or_else(|| MetaError::InvalidType {
        field: "request".to_string(),
        expected: "object",
    })?;
    object.insert(key.to_string(), value);
    Ok(())
}

fn report(err: &MetaError) {
    if err.is_internal() {
        error!(target: "metabridge::consistency", code = err.code(), "{err}");
    } else if err.is_validation() {
        warn!(code = err.code(), "rejected request: {err}");
    } else {
        debug!(code = err.code(), "request failed: {err}");
    }
}
