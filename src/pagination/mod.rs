//! Pagination strategies
//!
//! Short-page-is-last, envelope-page-counter, and single-page strategies,
//! plus the page-depth-ceiling re-windowing rule.

mod strategies;
mod types;

#[cfg(test)]
mod tests;

pub use strategies::{EnvelopePaginator, ShortPagePaginator, SinglePagePaginator};
pub use types::{extract_path, value_to_param, PageCursor, PageRequest, PageResponse, Paginator};
