//! Catalog operations for metabridge.
//!
//! Every operation takes an open [`Catalog`](metabridge_query::Catalog)
//! connection owned by the caller, validates its JSON input completely
//! before the first catalog call, and returns either a JSON value or a
//! [`MetaError`]:
//!
//! - listing: [`resolve_path`], [`list_path`]
//! - metadata: [`list_metadata`], [`modify_metadata`], [`modify_json_metadata`]
//! - permissions: [`list_permissions`], [`modify_permissions`],
//!   [`modify_json_permissions`], [`apply_permission_change`]
//! - search: [`search_metadata`]
//!
//! [`handler`] wraps these for request/response use, embedding failures
//! under the `"error"` key of the request.

pub mod handler;
mod listing;
mod metadata;
mod permissions;
mod search;

pub use listing::{list_path, resolve_path};
pub use metadata::{list_metadata, modify_json_metadata, modify_metadata, MetadataOutcome};
pub use permissions::{
    apply_permission_change, list_permissions, modify_json_permissions, modify_permissions,
};
pub use search::{search_metadata, AvuCondition, SearchOptions};

use metabridge_query::CatalogError;
use metabridge_types::MetaError;
use tracing::error;

/// Page size for listings, and the default row cap for searches.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Logs a failed catalog call and converts it into a `CollaboratorFailure`.
pub(crate) fn log_collaborator_error(action: &str, err: CatalogError) -> MetaError {
    error!(
        target: "metabridge::catalog",
        code = err.code,
        action,
        "{}",
        err.message
    );
    MetaError::from(err)
}

