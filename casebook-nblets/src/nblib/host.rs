//! Host name resolution and host entity enrichment.

use casebook_core::error::ProviderError;
use casebook_core::providers::{DataProviders, QueryArgs};
use casebook_core::timespan::Timespan;
use casebook_core::types::{AzureHostData, HostEntity};

use crate::nblib::queries;

/// The outcome of resolving a host name against event records.
///
/// Exactly one of the fields is populated when resolution succeeds or is
/// ambiguous; both are empty when no records were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostNameVerif {
    /// The unique resolved host name.
    pub host_name: Option<String>,
    /// Candidate names when the value matched more than one host.
    pub host_names: Vec<String>,
}

/// Resolve a host name against event records in the timespan.
///
/// A single candidate resolves directly. Among several candidates, a
/// case-insensitive exact match on the input wins; otherwise the result is
/// ambiguous and carries the candidate list.
pub fn verify_host_name(
    providers: &DataProviders,
    value: &str,
    timespan: &Timespan,
) -> Result<HostNameVerif, ProviderError> {
    let mut args = QueryArgs::new();
    args.insert("host_name".into(), value.to_string());
    let events = providers
        .query_provider()
        .run_query(queries::HOST_EVENTS, timespan, &args)?;

    let candidates = events.distinct_strings("Computer");
    match candidates.as_slice() {
        [] => Ok(HostNameVerif::default()),
        [single] => Ok(HostNameVerif {
            host_name: Some(single.clone()),
            host_names: Vec::new(),
        }),
        _ => {
            if let Some(exact) = candidates.iter().find(|c| c.eq_ignore_ascii_case(value)) {
                Ok(HostNameVerif {
                    host_name: Some(exact.clone()),
                    host_names: Vec::new(),
                })
            } else {
                Ok(HostNameVerif {
                    host_name: None,
                    host_names: candidates,
                })
            }
        }
    }
}

/// Build a host entity from the latest heartbeat record.
///
/// An empty heartbeat yields a bare entity carrying only the host name.
pub fn get_heartbeat(
    providers: &DataProviders,
    timespan: &Timespan,
    host_name: &str,
) -> Result<HostEntity, ProviderError> {
    let mut args = QueryArgs::new();
    args.insert("host_name".into(), host_name.to_string());
    let table = providers
        .query_provider()
        .run_query(queries::HEARTBEAT, timespan, &args)?;

    let mut entity = HostEntity::new(host_name);
    if table.is_empty() {
        return Ok(entity);
    }

    if let Some(name) = table.cell_str(0, "Computer") {
        entity.host_name = name.to_string();
    }
    if let Some(ip) = table.cell_str(0, "ComputerIP") {
        entity.add_ip_address(ip);
    }
    entity.dns_name = table.cell_str(0, "DnsDomain").map(str::to_string);
    entity.os_family = table.cell_str(0, "OSType").map(str::to_string);
    entity.os_version = match (
        table.cell_str(0, "OSMajorVersion"),
        table.cell_str(0, "OSMinorVersion"),
    ) {
        (Some(major), Some(minor)) => Some(format!("{major}.{minor}")),
        (Some(major), None) => Some(major.to_string()),
        _ => None,
    };
    entity.environment = table.cell_str(0, "ComputerEnvironment").map(str::to_string);

    let subscription_id = table.cell_str(0, "SubscriptionId").map(str::to_string);
    let resource_id = table.cell_str(0, "ResourceId").map(str::to_string);
    if subscription_id.is_some() || resource_id.is_some() {
        entity.azure = Some(AzureHostData {
            subscription_id,
            resource_id,
            ..AzureHostData::default()
        });
    }
    Ok(entity)
}

/// Add IP addresses from Azure network topology records to a host entity.
pub fn get_az_net_topology(
    providers: &DataProviders,
    timespan: &Timespan,
    host_entity: &mut HostEntity,
    host_name: &str,
) -> Result<(), ProviderError> {
    let mut args = QueryArgs::new();
    args.insert("host_name".into(), host_name.to_string());
    let table = providers
        .query_provider()
        .run_query(queries::AZ_NETWORK_ANALYTICS, timespan, &args)?;

    for row in 0..table.len() {
        for column in ["PrivateIPAddresses", "PublicIPAddresses"] {
            if let Some(addresses) = table.cell_str(row, column) {
                for address in addresses.split(',').map(str::trim).filter(|a| !a.is_empty()) {
                    host_entity.add_ip_address(address);
                }
            }
        }
    }
    Ok(())
}
