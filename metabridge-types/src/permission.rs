//! Access-control entries.

use crate::json::{as_object, optional_str, required_str};
use crate::{keys, MetaError, MetaResult};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Separates user and zone in an owner specifier such as `alice#tempZone`.
const OWNER_ZONE_SEPARATOR: char = '#';

/// Access granted to an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessLevel {
    /// No access; applying it removes an existing grant.
    Null,
    Read,
    Write,
    Own,
}

impl AccessLevel {
    /// Name used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Read => "read",
            Self::Write => "write",
            Self::Own => "own",
        }
    }

    /// Name used by the catalog.
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Read => "read object",
            Self::Write => "modify object",
            Self::Own => "own",
        }
    }

    /// Parses a catalog access name.
    pub fn from_native(name: &str) -> MetaResult<Self> {
        match name {
            "null" => Ok(Self::Null),
            "read object" => Ok(Self::Read),
            "modify object" => Ok(Self::Write),
            "own" => Ok(Self::Own),
            other => Err(MetaError::InvalidAccessLevel(other.to_string())),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(Self::Null),
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "own" => Ok(Self::Own),
            other => Err(MetaError::InvalidAccessLevel(other.to_string())),
        }
    }
}

/// Whether a change applies to a collection's descendants too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecursiveOp {
    #[default]
    NoRecurse,
    Recurse,
}

impl RecursiveOp {
    pub fn is_recursive(&self) -> bool {
        matches!(self, Self::Recurse)
    }
}

impl From<bool> for RecursiveOp {
    fn from(recurse: bool) -> Self {
        if recurse { Self::Recurse } else { Self::NoRecurse }
    }
}

/// One access-control entry: `{"owner", "zone"?, "access_type"}`.
///
/// Also used as the description of a permission change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub owner: String,
    pub zone: Option<String>,
    pub level: AccessLevel,
}

impl PermissionEntry {
    pub fn new(owner: impl Into<String>, level: AccessLevel) -> Self {
        Self {
            owner: owner.into(),
            zone: None,
            level,
        }
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into()).filter(|z: &String| !z.is_empty());
        self
    }

    /// Parses an owner specifier (`user` or `user#zone`) and a JSON level name.
    pub fn from_owner_specifier(specifier: &str, level: &str) -> MetaResult<Self> {
        let (owner, zone) = match specifier.split_once(OWNER_ZONE_SEPARATOR) {
            Some((owner, zone)) => (owner, Some(zone)),
            None => (specifier, None),
        };
        if owner.is_empty() {
            return Err(MetaError::MissingField(keys::OWNER.to_string()));
        }
        let mut entry = Self::new(owner, level.parse()?);
        if let Some(zone) = zone {
            entry = entry.with_zone(zone);
        }
        Ok(entry)
    }

    /// `user` or `user#zone`.
    pub fn owner_specifier(&self) -> String {
        match &self.zone {
            Some(zone) => format!("{}{OWNER_ZONE_SEPARATOR}{zone}", self.owner),
            None => self.owner.clone(),
        }
    }

    /// Parses an entry; an absent `access_type` means no access.
    pub fn from_json(json: &Value) -> MetaResult<Self> {
        as_object(json, "permission")?;
        let owner = required_str(json, keys::OWNER)?;
        if owner.is_empty() {
            return Err(MetaError::MissingField(keys::OWNER.to_string()));
        }
        let level = match optional_str(json, keys::ACCESS_TYPE)? {
            Some(level) => level.parse()?,
            None => AccessLevel::Null,
        };
        let mut entry = Self::new(owner, level);
        if let Some(zone) = optional_str(json, keys::ZONE)? {
            entry = entry.with_zone(zone);
        }
        Ok(entry)
    }

    /// JSON form; `zone` is omitted when unknown.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(keys::OWNER.into(), Value::String(self.owner.clone()));
        if let Some(zone) = &self.zone {
            map.insert(keys::ZONE.into(), Value::String(zone.clone()));
        }
        map.insert(
            keys::ACCESS_TYPE.into(),
            Value::String(self.level.as_str().to_string()),
        );
        Value::Object(map)
    }
}

/// Emits an array of permission entries.
pub fn permissions_to_json(entries: &[PermissionEntry]) -> Value {
    Value::Array(entries.iter().map(PermissionEntry::to_json).collect())
}

/// Validates a permission change description.
pub fn json_to_permission_change(json: &Value) -> MetaResult<PermissionEntry> {
    PermissionEntry::from_json(json)
}
