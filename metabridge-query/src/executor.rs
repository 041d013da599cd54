//! Runs queries against a catalog with guaranteed release.

use crate::{rows_to_json, Catalog, Continuation, QueryInput};
use metabridge_types::{MetaError, MetaResult};
use serde_json::Value;
use tracing::{debug, error, warn};

/// Executes `query` and maps its rows onto `labels`.
///
/// `labels` must name every selected column; a mismatch fails before the
/// catalog is contacted. Pages are fetched until the catalog runs out of
/// rows or `query.max_rows()` rows have been collected. The query is
/// consumed and any open cursor is closed before this returns, whatever
/// the outcome.
pub fn execute_query<C>(conn: &mut C, query: QueryInput, labels: &[&str]) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    let cap = query.max_rows();
    run_query(conn, &query, labels, Some(cap), |_| true)
}

/// Like [`execute_query`], but only rows accepted by `keep` are returned
/// and counted towards `query.max_rows()`.
///
/// Rejected rows never use up the cap, so paging continues past them.
pub fn execute_query_filtered<C, F>(
    conn: &mut C,
    query: QueryInput,
    labels: &[&str],
    keep: F,
) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
    F: FnMut(&[String]) -> bool,
{
    let cap = query.max_rows();
    run_query(conn, &query, labels, Some(cap), keep)
}

/// Executes `query` until the catalog has no more rows.
///
/// `query.max_rows()` is only the page size here; nothing is dropped.
pub fn execute_query_all<C>(conn: &mut C, query: QueryInput, labels: &[&str]) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
{
    run_query(conn, &query, labels, None, |_| true)
}

fn run_query<C, F>(
    conn: &mut C,
    query: &QueryInput,
    labels: &[&str],
    cap: Option<usize>,
    mut keep: F,
) -> MetaResult<Value>
where
    C: Catalog + ?Sized,
    F: FnMut(&[String]) -> bool,
{
    if labels.len() != query.columns().len() {
        error!(
            target: "metabridge::consistency",
            labels = labels.len(),
            columns = query.columns().len(),
            "query labels do not match selected columns"
        );
        return Err(MetaError::LabelColumnMismatch {
            labels: labels.len(),
            columns: query.columns().len(),
        });
    }

    debug!(
        columns = query.columns().len(),
        conditionals = query.conditionals().len(),
        max_rows = query.max_rows(),
        capped = cap.is_some(),
        "executing catalog query"
    );

    let rows = {
        let mut cursor = OpenQuery::new(conn);
        let mut rows = Vec::new();
        while cap.is_none_or(|cap| rows.len() < cap) {
            match cursor.next_page(query)? {
                Some(page) => rows.extend(page.into_iter().filter(|row| keep(row.as_slice()))),
                None => break,
            }
        }
        if let Some(cap) = cap {
            rows.truncate(cap);
        }
        rows
    };

    debug!(rows = rows.len(), "catalog query complete");
    rows_to_json(&rows, labels)
}

/// A query in progress. Dropping it closes any cursor still open.
struct OpenQuery<'a, C: Catalog + ?Sized> {
    conn: &'a mut C,
    continuation: Option<Continuation>,
    exhausted: bool,
}

impl<'a, C: Catalog + ?Sized> OpenQuery<'a, C> {
    fn new(conn: &'a mut C) -> Self {
        Self {
            conn,
            continuation: None,
            exhausted: false,
        }
    }

    /// Fetches the next page, `None` once the catalog has no more rows.
    fn next_page(&mut self, query: &QueryInput) -> MetaResult<Option<Vec<Vec<String>>>> {
        if self.exhausted {
            return Ok(None);
        }
        // On failure the previous cursor stays recorded so Drop releases it.
        let page = self
            .conn
            .execute_query(query, self.continuation)
            .map_err(|err| {
                error!(
                    target: "metabridge::catalog",
                    code = err.code,
                    "catalog query failed: {}",
                    err.message
                );
                MetaError::from(err)
            })?;
        self.continuation = page.continuation;
        self.exhausted = page.continuation.is_none();
        Ok(Some(page.rows))
    }
}

impl<C: Catalog + ?Sized> Drop for OpenQuery<'_, C> {
    fn drop(&mut self) {
        if let Some(continuation) = self.continuation.take() {
            if let Err(err) = self.conn.close_query(continuation) {
                warn!(
                    target: "metabridge::catalog",
                    code = err.code,
                    "failed to close query: {}",
                    err.message
                );
            }
        }
    }
}
