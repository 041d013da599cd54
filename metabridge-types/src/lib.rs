//! Core type definitions for metabridge.
//!
//! This crate defines the JSON-facing model shared by every other layer:
//! - [`Entity`] and the path conversions used at every JSON boundary
//! - [`Avu`] metadata triples and the duplicate check ([`has_avu`])
//! - [`PermissionEntry`] access-control entries and their access levels
//! - [`MetaError`], the error taxonomy, and [`ErrorRecord`], the bounded
//!   error report embedded into JSON results under the `"error"` key
//!
//! Input JSON is validated eagerly: each `from_json` constructor either
//! produces a fully typed value or fails with `MissingField` / `InvalidType`
//! before any catalog work starts.

mod avu;
mod entity;
mod error;
pub mod json;
mod permission;

pub use avu::{find_avu, has_avu, Avu, MetadataOp};
pub use entity::{
    collection_path_to_json, entity_to_json, json_to_path, path_to_json, Entity, EntityKind,
    PATH_SEPARATOR,
};
pub use error::{add_error_value, ErrorRecord, MetaError, MetaResult, MAX_ERROR_MESSAGE_LEN};
pub use permission::{
    json_to_permission_change, permissions_to_json, AccessLevel, PermissionEntry, RecursiveOp,
};

/// Reserved JSON keys.
pub mod keys {
    pub const COLLECTION: &str = "collection";
    pub const DATA_OBJECT: &str = "data_object";
    pub const ATTRIBUTE: &str = "attribute";
    pub const VALUE: &str = "value";
    pub const UNITS: &str = "units";
    pub const OPERATOR: &str = "operator";
    pub const AVUS: &str = "avus";
    pub const OWNER: &str = "owner";
    pub const ZONE: &str = "zone";
    pub const ACCESS_TYPE: &str = "access_type";
    pub const ACCESS: &str = "access";
    pub const CONTENTS: &str = "contents";
    pub const ERROR: &str = "error";
    pub const MESSAGE: &str = "message";
    pub const CODE: &str = "code";
}
