//! Logical storage locations and their JSON form.

use crate::json::{as_object, optional_str, required_str};
use crate::{keys, MetaError, MetaResult};
use serde_json::{json, Value};
use std::fmt;

/// Separator between path components.
pub const PATH_SEPARATOR: char = '/';

/// Whether an entity is a collection or a data object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Collection,
    DataObject,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => write!(f, "collection"),
            Self::DataObject => write!(f, "data object"),
        }
    }
}

/// A collection, or a data object inside a collection.
///
/// JSON shapes are `{"collection": c}` and
/// `{"collection": c, "data_object": d}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Collection { path: String },
    DataObject { collection: String, name: String },
}

impl Entity {
    pub fn collection(path: impl Into<String>) -> Self {
        Self::Collection { path: path.into() }
    }

    pub fn data_object(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DataObject {
            collection: collection.into(),
            name: name.into(),
        }
    }

    /// Splits a full data-object path into its collection and name.
    pub fn from_data_object_path(path: &str) -> Self {
        Self::data_object(dirname(path), basename(path))
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Collection { .. } => EntityKind::Collection,
            Self::DataObject { .. } => EntityKind::DataObject,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }

    /// The collection this entity is, or lives in.
    pub fn collection_name(&self) -> &str {
        match self {
            Self::Collection { path } => path,
            Self::DataObject { collection, .. } => collection,
        }
    }

    pub fn data_object_name(&self) -> Option<&str> {
        match self {
            Self::Collection { .. } => None,
            Self::DataObject { name, .. } => Some(name),
        }
    }

    /// Full path of the entity.
    pub fn path(&self) -> String {
        match self {
            Self::Collection { path } => path.clone(),
            Self::DataObject { collection, name } => join_path(collection, name),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Collection { path } => json!({ keys::COLLECTION: path }),
            Self::DataObject { collection, name } => json!({
                keys::COLLECTION: collection,
                keys::DATA_OBJECT: name,
            }),
        }
    }

    /// Parses an entity from its JSON form.
    pub fn from_json(json: &Value) -> MetaResult<Self> {
        as_object(json, "entity")?;
        let collection = required_str(json, keys::COLLECTION)?;
        match optional_str(json, keys::DATA_OBJECT)? {
            Some(name) => Ok(Self::data_object(collection, name)),
            None => Ok(Self::collection(collection)),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Emits the JSON shape matching the entity's kind.
pub fn entity_to_json(entity: &Entity) -> Value {
    entity.to_json()
}

/// Converts entity JSON to a path string.
///
/// The data-object name is appended to the collection with exactly one
/// separator between them.
pub fn json_to_path(json: &Value) -> MetaResult<String> {
    Entity::from_json(json).map(|entity| entity.path())
}

/// Converts a data-object path to `{"collection", "data_object"}`.
pub fn path_to_json(path: &str) -> Value {
    Entity::from_data_object_path(path).to_json()
}

/// Converts a collection path to `{"collection"}`.
pub fn collection_path_to_json(path: &str) -> Value {
    Entity::collection(path).to_json()
}

pub(crate) fn join_path(collection: &str, name: &str) -> String {
    if collection.ends_with(PATH_SEPARATOR) {
        format!("{collection}{name}")
    } else {
        format!("{collection}{PATH_SEPARATOR}{name}")
    }
}

/// POSIX `dirname`.
fn dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        return if path.is_empty() { ".".into() } else { "/".into() };
    }
    match trimmed.rfind(PATH_SEPARATOR) {
        None => ".".into(),
        Some(idx) => {
            let parent = trimmed[..idx].trim_end_matches(PATH_SEPARATOR);
            if parent.is_empty() {
                "/".into()
            } else {
                parent.into()
            }
        }
    }
}

/// POSIX `basename`.
fn basename(path: &str) -> String {
    let trimmed = path.trim_end_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        return if path.is_empty() { ".".into() } else { "/".into() };
    }
    match trimmed.rfind(PATH_SEPARATOR) {
        None => trimmed.into(),
        Some(idx) => trimmed[idx + 1..].into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirname_matches_posix() {
        assert_eq!(dirname("/a/b/c"), "/a/b");
        assert_eq!(dirname("/a/b/c/"), "/a/b");
        assert_eq!(dirname("/c"), "/");
        assert_eq!(dirname("c"), ".");
        assert_eq!(dirname("/"), "/");
        assert_eq!(dirname("//a//b"), "//a");
        assert_eq!(dirname(""), ".");
    }

    #[test]
    fn basename_matches_posix() {
        assert_eq!(basename("/a/b/c"), "c");
        assert_eq!(basename("/a/b/c/"), "c");
        assert_eq!(basename("c"), "c");
        assert_eq!(basename("/"), "/");
    }

    #[test]
    fn join_never_doubles_separator() {
        assert_eq!(join_path("/", "x"), "/x");
        assert_eq!(join_path("/a", "x"), "/a/x");
        assert_eq!(join_path("/a/", "x"), "/a/x");
    }

    #[test]
    fn invalid_data_object_type() {
        let j = json!({"collection": "/a", "data_object": 7});
        assert!(matches!(
            json_to_path(&j),
            Err(MetaError::InvalidType { .. })
        ));
    }
}
