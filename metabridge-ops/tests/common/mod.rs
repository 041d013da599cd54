//! Shared test helpers for operation tests.

#![allow(dead_code)]

use metabridge_query::{Catalog, CatalogError, CatalogResult, Continuation, QueryInput, QueryPage};
use metabridge_store::SqliteCatalog;
use metabridge_types::{Avu, Entity, MetadataOp, PermissionEntry, RecursiveOp};

/// Catalog whose every call fails with the same error.
pub struct FailingCatalog {
    pub error: CatalogError,
    pub calls: usize,
}

impl FailingCatalog {
    pub fn new(code: i32, message: &str) -> Self {
        Self {
            error: CatalogError::new(code, message),
            calls: 0,
        }
    }

    /// The error a missing path produces.
    pub fn not_found() -> Self {
        Self::new(-808_000, "object not found")
    }

    fn fail<T>(&mut self) -> CatalogResult<T> {
        self.calls += 1;
        Err(self.error.clone())
    }
}

impl Catalog for FailingCatalog {
    fn resolve_path(&mut self, _: &str) -> CatalogResult<Entity> {
        self.fail()
    }

    fn execute_query(
        &mut self,
        _: &QueryInput,
        _: Option<Continuation>,
    ) -> CatalogResult<QueryPage> {
        self.fail()
    }

    fn close_query(&mut self, _: Continuation) -> CatalogResult<()> {
        self.fail()
    }

    fn apply_metadata(&mut self, _: &Entity, _: MetadataOp, _: &Avu) -> CatalogResult<()> {
        self.fail()
    }

    fn apply_permission(
        &mut self,
        _: &Entity,
        _: RecursiveOp,
        _: &PermissionEntry,
    ) -> CatalogResult<()> {
        self.fail()
    }
}

/// Wraps a catalog and counts the calls made through it.
pub struct CountingCatalog<C> {
    pub inner: C,
    pub queries: usize,
    pub metadata_changes: usize,
    pub permission_changes: usize,
    pub resolves: usize,
}

impl<C: Catalog> CountingCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            queries: 0,
            metadata_changes: 0,
            permission_changes: 0,
            resolves: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.queries + self.metadata_changes + self.permission_changes + self.resolves
    }
}

impl<C: Catalog> Catalog for CountingCatalog<C> {
    fn resolve_path(&mut self, path: &str) -> CatalogResult<Entity> {
        self.resolves += 1;
        self.inner.resolve_path(path)
    }

    fn execute_query(
        &mut self,
        query: &QueryInput,
        continuation: Option<Continuation>,
    ) -> CatalogResult<QueryPage> {
        self.queries += 1;
        self.inner.execute_query(query, continuation)
    }

    fn close_query(&mut self, continuation: Continuation) -> CatalogResult<()> {
        self.inner.close_query(continuation)
    }

    fn apply_metadata(
        &mut self,
        entity: &Entity,
        op: MetadataOp,
        avu: &Avu,
    ) -> CatalogResult<()> {
        self.metadata_changes += 1;
        self.inner.apply_metadata(entity, op, avu)
    }

    fn apply_permission(
        &mut self,
        entity: &Entity,
        recurse: RecursiveOp,
        change: &PermissionEntry,
    ) -> CatalogResult<()> {
        self.permission_changes += 1;
        self.inner.apply_permission(entity, recurse, change)
    }
}

/// A small namespace:
///
/// ```text
/// /zone/home/alice/
///     a.txt
///     run1/   x.bam  y.bam
///     run10/  z.bam
/// ```
pub fn populated() -> SqliteCatalog {
    let mut cat = SqliteCatalog::open_in_memory().unwrap();
    for coll in ["/zone/home/alice/run1", "/zone/home/alice/run10"] {
        cat.create_collection(coll).unwrap();
    }
    for obj in [
        "/zone/home/alice/a.txt",
        "/zone/home/alice/run1/x.bam",
        "/zone/home/alice/run1/y.bam",
        "/zone/home/alice/run10/z.bam",
    ] {
        cat.create_data_object(obj).unwrap();
    }
    cat
}

pub fn data_object(collection: &str, name: &str) -> Entity {
    Entity::data_object(collection, name)
}

pub fn collection(path: &str) -> Entity {
    Entity::collection(path)
}
