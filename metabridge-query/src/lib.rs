//! Catalog query layer for metabridge.
//!
//! A query is a [`QueryInput`]: the output [`Column`]s to select, up to
//! [`MAX_NUM_CONDITIONALS`] conjunctive [`Conditional`]s and a row cap.
//! [`execute_query`] sends it to a [`Catalog`], pages through the results
//! and maps each row onto caller-supplied labels with [`rows_to_json`].
//! [`execute_query_filtered`] counts only accepted rows towards the cap and
//! [`execute_query_all`] treats `max_rows` as a page size and reads every row.
//!
//! # Resource handling
//!
//! Paged results hold a server-side cursor ([`Continuation`]). The executor
//! wraps every open cursor in a guard that closes it when dropped, so a
//! query is released on every exit path, including errors and early stops
//! at the row cap.

mod assemble;
mod catalog;
mod column;
mod executor;
mod operator;
mod query;

pub use assemble::rows_to_json;
pub use catalog::{Catalog, CatalogError, CatalogResult, Continuation, QueryPage};
pub use column::Column;
pub use executor::{execute_query, execute_query_all, execute_query_filtered};
pub use operator::Operator;
pub use query::{
    is_within, make_query, scope_conditional, Conditional, QueryInput, MAX_NUM_CONDITIONALS,
};
