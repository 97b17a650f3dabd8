//! Threat-intelligence enrichment for a host's IP addresses.

use tracing::debug;

use casebook_core::cache::SessionCache;
use casebook_core::providers::TiLookupProvider;
use casebook_core::types::{HostEntity, TableData};

/// Cache for TI lookups, keyed by the observable batch.
pub type TiCache = SessionCache<Vec<String>, TableData>;

/// Look up the host's IP addresses against threat-intelligence feeds.
///
/// Returns `None` when the host carries no IP addresses or the lookup
/// fails; lookup failures are logged at debug and never fail the run.
pub fn ti_results_for_host(
    provider: &dyn TiLookupProvider,
    cache: &mut TiCache,
    host: &HostEntity,
) -> Option<TableData> {
    if host.ip_addresses.is_empty() {
        return None;
    }
    let observables = host.ip_addresses.clone();
    let fetched =
        cache.get_or_try_insert_with(observables.clone(), || provider.lookup_iocs(&observables));
    match fetched {
        Ok(table) => Some(table),
        Err(err) => {
            debug!(host = %host.host_name, error = %err, "TI lookup failed");
            None
        }
    }
}
