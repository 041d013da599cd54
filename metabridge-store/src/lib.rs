//! SQLite-backed catalog for metabridge.
//!
//! [`SqliteCatalog`] implements the [`metabridge_query::Catalog`] collaborator
//! over a single SQLite file (or an in-memory database for tests). It keeps
//! three tables:
//!
//! - `entities`: collections and data objects, keyed by kind and path
//! - `avus`: AVU metadata attached to entities
//! - `acls`: access-control entries attached to entities
//!
//! Generic queries are translated into one parameterised `SELECT` per page;
//! see [`SqliteCatalog::execute_query`](metabridge_query::Catalog::execute_query).
//! Recursive permission changes run inside a single transaction.

mod catalog;
mod error;
mod plan;
mod schema;

pub use catalog::{SqliteCatalog, DEFAULT_ZONE};
pub use error::{codes, StoreError, StoreResult};
