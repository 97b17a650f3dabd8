//! Host-focused notebooklets.

pub mod host_summary;

use casebook_catalog::Registration;
use casebook_core::error::CatalogError;

/// Registrations for the `host.host_summary` module.
pub fn registrations() -> Result<Vec<Registration>, CatalogError> {
    Ok(vec![Registration {
        metadata: host_summary::HostSummary::declared_metadata(),
        factory: host_summary::factory,
    }])
}
