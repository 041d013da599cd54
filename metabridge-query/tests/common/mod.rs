//! Shared test helpers for query tests.

#![allow(dead_code)]

use metabridge_query::{Catalog, CatalogError, CatalogResult, Continuation, QueryInput, QueryPage};
use metabridge_types::{Avu, Entity, MetadataOp, PermissionEntry, RecursiveOp};
use std::collections::{HashSet, VecDeque};

/// Catalog double that replays scripted pages and tracks open cursors.
#[derive(Default)]
pub struct ScriptedCatalog {
    pages: VecDeque<CatalogResult<QueryPage>>,
    open: HashSet<Continuation>,
    pub calls: usize,
    pub closed: Vec<Continuation>,
}

impl ScriptedCatalog {
    pub fn new(pages: Vec<CatalogResult<QueryPage>>) -> Self {
        Self {
            pages: pages.into(),
            ..Self::default()
        }
    }

    /// Cursors the catalog handed out that were never resumed or closed.
    pub fn open_cursors(&self) -> usize {
        self.open.len()
    }
}

impl Catalog for ScriptedCatalog {
    fn resolve_path(&mut self, path: &str) -> CatalogResult<Entity> {
        Ok(Entity::collection(path))
    }

    fn execute_query(
        &mut self,
        _query: &QueryInput,
        continuation: Option<Continuation>,
    ) -> CatalogResult<QueryPage> {
        self.calls += 1;
        if let Some(c) = continuation {
            if !self.open.remove(&c) {
                return Err(CatalogError::new(-1, format!("unknown cursor {}", c.id())));
            }
        }
        let page = self
            .pages
            .pop_front()
            .unwrap_or_else(|| Ok(QueryPage::default()))?;
        if let Some(c) = page.continuation {
            self.open.insert(c);
        }
        Ok(page)
    }

    fn close_query(&mut self, continuation: Continuation) -> CatalogResult<()> {
        self.closed.push(continuation);
        if self.open.remove(&continuation) {
            Ok(())
        } else {
            Err(CatalogError::new(-1, "cursor already closed"))
        }
    }

    fn apply_metadata(&mut self, _: &Entity, _: MetadataOp, _: &Avu) -> CatalogResult<()> {
        Ok(())
    }

    fn apply_permission(
        &mut self,
        _: &Entity,
        _: RecursiveOp,
        _: &PermissionEntry,
    ) -> CatalogResult<()> {
        Ok(())
    }
}

pub fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn page(rows: &[&[&str]], continuation: Option<u64>) -> CatalogResult<QueryPage> {
    Ok(QueryPage {
        rows: rows.iter().map(|r| row(r)).collect(),
        continuation: continuation.map(Continuation::new),
    })
}
