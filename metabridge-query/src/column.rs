//! Catalog columns that may be selected or constrained.

use metabridge_types::MetaError;
use std::fmt;

/// A catalog column.
///
/// Each variant maps to the catalog's numeric column identifier; unknown
/// identifiers are rejected by `TryFrom<i32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    CollName,
    CollParentName,
    DataName,
    DataMetaAttrName,
    DataMetaAttrValue,
    DataMetaAttrUnits,
    CollMetaAttrName,
    CollMetaAttrValue,
    CollMetaAttrUnits,
    UserName,
    UserZone,
    DataAccessName,
    CollAccessName,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::CollName,
        Column::CollParentName,
        Column::DataName,
        Column::DataMetaAttrName,
        Column::DataMetaAttrValue,
        Column::DataMetaAttrUnits,
        Column::CollMetaAttrName,
        Column::CollMetaAttrValue,
        Column::CollMetaAttrUnits,
        Column::UserName,
        Column::UserZone,
        Column::DataAccessName,
        Column::CollAccessName,
    ];

    /// The catalog's identifier for this column.
    pub fn native_id(&self) -> i32 {
        match self {
            Self::UserName => 202,
            Self::UserZone => 204,
            Self::DataName => 403,
            Self::CollName => 501,
            Self::CollParentName => 502,
            Self::DataMetaAttrName => 600,
            Self::DataMetaAttrValue => 601,
            Self::DataMetaAttrUnits => 602,
            Self::CollMetaAttrName => 610,
            Self::CollMetaAttrValue => 611,
            Self::CollMetaAttrUnits => 612,
            Self::DataAccessName => 701,
            Self::CollAccessName => 711,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CollName => "COL_COLL_NAME",
            Self::CollParentName => "COL_COLL_PARENT_NAME",
            Self::DataName => "COL_DATA_NAME",
            Self::DataMetaAttrName => "COL_META_DATA_ATTR_NAME",
            Self::DataMetaAttrValue => "COL_META_DATA_ATTR_VALUE",
            Self::DataMetaAttrUnits => "COL_META_DATA_ATTR_UNITS",
            Self::CollMetaAttrName => "COL_META_COLL_ATTR_NAME",
            Self::CollMetaAttrValue => "COL_META_COLL_ATTR_VALUE",
            Self::CollMetaAttrUnits => "COL_META_COLL_ATTR_UNITS",
            Self::UserName => "COL_USER_NAME",
            Self::UserZone => "COL_USER_ZONE",
            Self::DataAccessName => "COL_DATA_ACCESS_NAME",
            Self::CollAccessName => "COL_COLL_ACCESS_NAME",
        }
    }

    /// True for columns that only exist on data objects.
    pub fn is_data_object(&self) -> bool {
        matches!(
            self,
            Self::DataName
                | Self::DataMetaAttrName
                | Self::DataMetaAttrValue
                | Self::DataMetaAttrUnits
                | Self::DataAccessName
        )
    }

    /// True for AVU columns of either entity kind.
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            Self::DataMetaAttrName
                | Self::DataMetaAttrValue
                | Self::DataMetaAttrUnits
                | Self::CollMetaAttrName
                | Self::CollMetaAttrValue
                | Self::CollMetaAttrUnits
        )
    }

    /// True for columns describing access-control entries.
    pub fn is_access(&self) -> bool {
        matches!(
            self,
            Self::UserName | Self::UserZone | Self::DataAccessName | Self::CollAccessName
        )
    }
}

impl TryFrom<i32> for Column {
    type Error = MetaError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|column| column.native_id() == id)
            .ok_or_else(|| MetaError::InvalidType {
                field: format!("column {id}"),
                expected: "known catalog column",
            })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
