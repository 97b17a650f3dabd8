//! Account-focused notebooklets.

pub mod account_summary;

use casebook_catalog::Registration;
use casebook_core::error::CatalogError;

/// Registrations for the `account.account_summary` module.
pub fn registrations() -> Result<Vec<Registration>, CatalogError> {
    Ok(vec![Registration {
        metadata: account_summary::AccountSummary::declared_metadata(),
        factory: account_summary::factory,
    }])
}
