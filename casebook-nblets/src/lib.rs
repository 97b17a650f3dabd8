//! # Casebook Notebooklets
//!
//! The notebooklet implementations shipped with Casebook, their shared
//! helper library, and the static module manifest the catalog scanner
//! consumes.
//!
//! ```no_run
//! use casebook_catalog::{build_catalog, discover_modules};
//! use casebook_nblets::manifest;
//!
//! let catalog = build_catalog(&discover_modules(&manifest()));
//! assert!(catalog.get("HostSummary").is_some());
//! ```

pub mod account;
pub mod host;
pub mod nblib;

use casebook_catalog::NotebookletModule;

pub use account::account_summary::AccountSummary;
pub use host::host_summary::HostSummary;

/// The static manifest of notebooklet modules shipped with this crate.
pub fn manifest() -> Vec<NotebookletModule> {
    vec![
        NotebookletModule {
            path: "account.account_summary",
            registrations: account::registrations,
        },
        NotebookletModule {
            path: "host.host_summary",
            registrations: host::registrations,
        },
    ]
}
