//! The catalog collaborator interface.

use crate::QueryInput;
use metabridge_types::{Avu, Entity, MetaError, MetadataOp, PermissionEntry, RecursiveOp};
use thiserror::Error;

/// Result type for catalog calls.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// An error reported by the catalog, with its native code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CatalogError {
    pub code: i32,
    pub message: String,
}

impl CatalogError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<CatalogError> for MetaError {
    fn from(err: CatalogError) -> Self {
        MetaError::CollaboratorFailure {
            code: err.code,
            message: err.message,
        }
    }
}

/// Server-side cursor for fetching the next page of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Continuation(u64);

impl Continuation {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// One page of query results.
///
/// Each row holds one value per selected column, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPage {
    pub rows: Vec<Vec<String>>,
    /// Present while more rows remain; must be passed back or closed.
    pub continuation: Option<Continuation>,
}

/// A connection to the metadata catalog.
///
/// Implementations are single connections: calls must not be made
/// concurrently on the same value.
pub trait Catalog {
    /// Resolves a path to a collection or data object.
    fn resolve_path(&mut self, path: &str) -> CatalogResult<Entity>;

    /// Runs `query`, or continues it from `continuation`.
    ///
    /// A page never holds more than `query.max_rows()` rows.
    fn execute_query(
        &mut self,
        query: &QueryInput,
        continuation: Option<Continuation>,
    ) -> CatalogResult<QueryPage>;

    /// Releases a query that still has rows pending.
    fn close_query(&mut self, continuation: Continuation) -> CatalogResult<()>;

    /// Adds or removes one AVU.
    fn apply_metadata(&mut self, entity: &Entity, op: MetadataOp, avu: &Avu)
    -> CatalogResult<()>;

    /// Applies a permission change, to descendants too under
    /// [`RecursiveOp::Recurse`]. Whether a recursive change is atomic is up
    /// to the implementation.
    fn apply_permission(
        &mut self,
        entity: &Entity,
        recurse: RecursiveOp,
        change: &PermissionEntry,
    ) -> CatalogResult<()>;
}
