//! Notebooklet catalog for Casebook.
//!
//! Scans a static module manifest into a registry with a nested namespace
//! and keyword index, answers free-text and per-class term queries, and
//! exposes registered classes as entity pivot functions.
//!
//! ```no_run
//! use casebook_catalog::{build_catalog, discover_modules, find};
//!
//! let catalog = build_catalog(&discover_modules(&[]));
//! for hit in find(&catalog, "host windows azure") {
//!     println!("{} ({} terms)", hit.entry.name(), hit.match_count);
//! }
//! ```

pub mod index;
pub mod pivot;
pub mod scan;
pub mod search;

#[cfg(test)]
mod testing;

pub use index::{build_catalog, Catalog, CatalogEntry, CatalogNode, TermIndex};
pub use pivot::{build_pivots, PivotFunction, PivotSet, TimespanSource};
pub use scan::{discover_modules, NotebookletFactory, NotebookletModule, Registration, ScanOutput};
pub use search::{find, match_terms, SearchMatch};
