//! Attribute-value-unit metadata triples.

use crate::json::{as_object, optional_str, required_str};
use crate::{keys, MetaError, MetaResult};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// An attribute-value-unit triple.
///
/// Equality treats a missing unit and an empty unit as the same thing, so
/// `{"attribute":"a","value":"1"}` equals `{"attribute":"a","value":"1","units":""}`.
#[derive(Debug, Clone, Eq)]
pub struct Avu {
    pub attribute: String,
    pub value: String,
    pub units: Option<String>,
}

impl Avu {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            units: None,
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// The unit, with an empty string reported as no unit.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref().filter(|u| !u.is_empty())
    }

    /// The unit, with no unit reported as the empty string.
    pub fn units_or_empty(&self) -> &str {
        self.units().unwrap_or("")
    }

    /// Parses `{"attribute", "value", "units"?}`.
    pub fn from_json(json: &Value) -> MetaResult<Self> {
        as_object(json, "avu")?;
        let attribute = required_str(json, keys::ATTRIBUTE)?;
        let value = required_str(json, keys::VALUE)?;
        let units = optional_str(json, keys::UNITS)?;
        Ok(Self {
            attribute: attribute.to_string(),
            value: value.to_string(),
            units: units.map(str::to_string),
        })
    }

    /// JSON form; the `units` key is omitted when there is no unit.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(keys::ATTRIBUTE.into(), Value::String(self.attribute.clone()));
        map.insert(keys::VALUE.into(), Value::String(self.value.clone()));
        if let Some(units) = self.units() {
            map.insert(keys::UNITS.into(), Value::String(units.to_string()));
        }
        Value::Object(map)
    }
}

impl PartialEq for Avu {
    fn eq(&self, other: &Self) -> bool {
        self.attribute == other.attribute
            && self.value == other.value
            && self.units() == other.units()
    }
}

impl fmt::Display for Avu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{'{}', '{}', '{}'}}",
            self.attribute,
            self.value,
            self.units_or_empty()
        )
    }
}

/// Returns the first AVU in `avus` equal to `candidate`, scanning in order.
pub fn find_avu<'a>(avus: &'a [Avu], candidate: &Avu) -> Option<&'a Avu> {
    avus.iter().find(|avu| *avu == candidate)
}

/// True if `avus` already contains `candidate`.
pub fn has_avu(avus: &[Avu], candidate: &Avu) -> bool {
    find_avu(avus, candidate).is_some()
}

/// A metadata operation on one AVU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOp {
    Add,
    Remove,
    Query,
}

impl MetadataOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "rm",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for MetadataOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataOp {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "rm" => Ok(Self::Remove),
            "query" => Ok(Self::Query),
            other => Err(MetaError::InvalidOperation(other.to_string())),
        }
    }
}
