//! Query descriptors.

use crate::{Column, Operator};
use metabridge_types::{MetaError, MetaResult, RecursiveOp, PATH_SEPARATOR};

/// Most conditionals a single query may carry.
pub const MAX_NUM_CONDITIONALS: usize = 20;

/// One `column operator value` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub column: Column,
    pub operator: Operator,
    pub value: String,
}

impl Conditional {
    pub fn new(column: Column, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            column,
            operator,
            value: value.into(),
        }
    }

    pub fn eq(column: Column, value: impl Into<String>) -> Self {
        Self::new(column, Operator::Equals, value)
    }

    pub fn like(column: Column, value: impl Into<String>) -> Self {
        Self::new(column, Operator::Like, value)
    }
}

/// A catalog query: selected columns, conjunctive conditionals and a row cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInput {
    max_rows: usize,
    columns: Vec<Column>,
    conditionals: Vec<Conditional>,
    zone_hint: Option<String>,
}

impl QueryInput {
    /// Creates a query selecting `columns`, returning at most `max_rows` rows.
    ///
    /// A cap of zero is raised to one.
    pub fn new(max_rows: usize, columns: &[Column]) -> Self {
        Self {
            max_rows: max_rows.max(1),
            columns: columns.to_vec(),
            conditionals: Vec::new(),
            zone_hint: None,
        }
    }

    /// Appends `conds` to the query.
    ///
    /// Fails with `TooManyConditionals`, leaving the query unchanged, if the
    /// total would exceed [`MAX_NUM_CONDITIONALS`].
    pub fn add_conditionals(&mut self, conds: &[Conditional]) -> MetaResult<&mut Self> {
        let requested = self.conditionals.len() + conds.len();
        if requested > MAX_NUM_CONDITIONALS {
            return Err(MetaError::TooManyConditionals {
                requested,
                limit: MAX_NUM_CONDITIONALS,
            });
        }
        self.conditionals.extend_from_slice(conds);
        Ok(self)
    }

    /// Builder form of [`QueryInput::add_conditionals`].
    pub fn with_conditionals(mut self, conds: &[Conditional]) -> MetaResult<Self> {
        self.add_conditionals(conds)?;
        Ok(self)
    }

    /// Names the zone the catalog should answer from.
    #[must_use]
    pub fn with_zone_hint(mut self, zone: Option<&str>) -> Self {
        self.zone_hint = zone.filter(|z| !z.is_empty()).map(str::to_string);
        self
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn conditionals(&self) -> &[Conditional] {
        &self.conditionals
    }

    pub fn zone_hint(&self) -> Option<&str> {
        self.zone_hint.as_deref()
    }
}

/// Allocates a query descriptor.
pub fn make_query(max_rows: usize, columns: &[Column]) -> QueryInput {
    QueryInput::new(max_rows, columns)
}

/// Conditional restricting `column` to `path`, or with [`RecursiveOp::Recurse`]
/// to `path` and everything below it.
///
/// The recursive form is an unescaped prefix match: it also matches siblings
/// that share the prefix (`/a/bc` for `/a/b`), and `_` or `%` in `path` act
/// as wildcards. Callers keep only rows that pass [`is_within`], for example
/// with [`execute_query_filtered`](crate::execute_query_filtered).
pub fn scope_conditional(column: Column, path: &str, recurse: RecursiveOp) -> Conditional {
    match recurse {
        RecursiveOp::NoRecurse => Conditional::eq(column, path),
        RecursiveOp::Recurse => Conditional::like(column, format!("{path}%")),
    }
}

/// True if `path` is `root` or lies below it.
pub fn is_within(path: &str, root: &str) -> bool {
    let root = root.trim_end_matches(PATH_SEPARATOR);
    if root.is_empty() {
        return path.starts_with(PATH_SEPARATOR);
    }
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with(PATH_SEPARATOR),
        None => false,
    }
}
