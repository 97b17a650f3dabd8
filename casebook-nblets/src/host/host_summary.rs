//! Summarize what is known about a host: entity details from heartbeat
//! and network topology, related alerts, investigation bookmarks, and
//! (for Azure hosts, when the provider is configured) resource API detail.

use tracing::debug;

use casebook_core::cache::SessionCache;
use casebook_core::display::NotebookOutput;
use casebook_core::error::{NotebookletError, ProviderError};
use casebook_core::notebooklet::{
    resolve_options, Notebooklet, NotebookletMetadata, NotebookletResult, OptionDoc, RunRequest,
};
use casebook_core::providers::{DataProviders, QueryArgs, PROVIDER_QUERY};
use casebook_core::timespan::Timespan;
use casebook_core::types::{Entity, EntityType, HostEntity, TableData};
use casebook_core::Result;

use crate::nblib::alert::{alert_timeline, fetch_related_alerts, AlertCache};
use crate::nblib::azure::{azure_api_details, AzureApiCache};
use crate::nblib::host::{get_az_net_topology, get_heartbeat, verify_host_name};
use crate::nblib::iptools::{ti_results_for_host, TiCache};
use crate::nblib::queries;

/// Construct a [`HostSummary`] bound to a provider set.
pub fn factory(providers: &DataProviders) -> Result<Box<dyn Notebooklet>> {
    Ok(Box::new(HostSummary::new(providers)?))
}

/// Host summary notebooklet.
pub struct HostSummary {
    metadata: NotebookletMetadata,
    providers: DataProviders,
    alert_cache: AlertCache,
    bookmark_cache: SessionCache<(String, Timespan), TableData>,
    azure_cache: AzureApiCache,
    ti_cache: TiCache,
    last_result: Option<NotebookletResult>,
}

impl HostSummary {
    pub fn declared_metadata() -> NotebookletMetadata {
        NotebookletMetadata {
            name: "HostSummary".into(),
            module_path: "host.host_summary".into(),
            description: "Host summary: entity details, related alerts, and \
                          investigation bookmarks for a host"
                .into(),
            category: "host".into(),
            keywords: [
                "host",
                "computer",
                "heartbeat",
                "windows",
                "linux",
                "azure",
                "alerts",
                "bookmarks",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            entity_types: vec![EntityType::Host],
            options: vec![
                OptionDoc::new(
                    "heartbeat",
                    "Query the latest heartbeat record for the host.",
                    true,
                ),
                OptionDoc::new(
                    "azure_net",
                    "Query network topology records for the host.",
                    true,
                ),
                OptionDoc::new("alerts", "Query alerts related to the host.", true),
                OptionDoc::new(
                    "bookmarks",
                    "Query investigation bookmarks related to the host.",
                    true,
                ),
                OptionDoc::new(
                    "azure_api",
                    "Query the resource API for Azure VM details.",
                    false,
                ),
                OptionDoc::new(
                    "ti",
                    "Look up threat intelligence for the host's IP addresses.",
                    false,
                ),
            ],
            req_providers: vec![PROVIDER_QUERY.to_string()],
        }
    }

    pub fn new(providers: &DataProviders) -> Result<Self> {
        let metadata = Self::declared_metadata();
        providers.require(&metadata.req_providers, &metadata.name)?;
        Ok(Self {
            metadata,
            providers: providers.clone(),
            alert_cache: AlertCache::new(),
            bookmark_cache: SessionCache::new(),
            azure_cache: AzureApiCache::new(),
            ti_cache: TiCache::new(),
            last_result: None,
        })
    }

    /// A browsable view over the alerts in the last result, if any.
    pub fn browse_alerts(&self) -> Option<TableData> {
        self.last_result
            .as_ref()
            .and_then(crate::nblib::alert::browse_alerts)
    }

    /// Drop all memoized fetches so the next run hits the providers.
    pub fn reset_cache(&mut self) {
        self.alert_cache.clear();
        self.bookmark_cache.clear();
        self.azure_cache.clear();
        self.ti_cache.clear();
    }

    fn fetch_bookmarks(
        &mut self,
        output: &NotebookOutput,
        timespan: &Timespan,
        host_name: &str,
    ) -> std::result::Result<TableData, ProviderError> {
        output.data_wait("Bookmarks");
        let providers = &self.providers;
        self.bookmark_cache
            .get_or_try_insert_with((host_name.to_string(), *timespan), || {
                let mut args = QueryArgs::new();
                args.insert("entity_id".into(), host_name.to_string());
                let bookmarks = providers.query_provider().run_query(
                    queries::ENTITY_BOOKMARKS,
                    timespan,
                    &args,
                )?;
                if bookmarks.is_empty() {
                    output.markdown("No bookmarks found.");
                } else {
                    output.markdown(&format!(
                        "{} investigation bookmarks found for this host.",
                        bookmarks.len()
                    ));
                }
                Ok(bookmarks)
            })
    }
}

impl Notebooklet for HostSummary {
    fn metadata(&self) -> &NotebookletMetadata {
        &self.metadata
    }

    fn run(&mut self, request: RunRequest) -> Result<NotebookletResult> {
        let options = resolve_options(&self.metadata, request.options.as_deref())?;
        let value = request
            .value
            .as_deref()
            .ok_or(NotebookletError::MissingParameter {
                name: "value".into(),
            })?;
        let timespan = request
            .timespan
            .ok_or(NotebookletError::MissingParameter {
                name: "timespan".into(),
            })?;
        let has = |name: &str| options.iter().any(|o| o == name);
        let output = self.providers.output().with_run_silent(request.silent);

        let mut result =
            NotebookletResult::new(self.metadata.description.clone(), Some(timespan));

        let verif = verify_host_name(&self.providers, value, &timespan)?;
        if !verif.host_names.is_empty() {
            let message = format!("Could not obtain unique host name from {value}. Aborting.");
            output.markdown(&message);
            result.add_message(message);
            self.last_result = Some(result.clone());
            return Ok(result);
        }
        let host_name = match verif.host_name {
            Some(name) => name,
            None => {
                output.markdown(&format!(
                    "Could not find event records for host {value}. \
                     Results may be unreliable."
                ));
                value.to_string()
            }
        };

        let mut host_entity = HostEntity::new(&host_name);
        if has("heartbeat") {
            output.data_wait("Heartbeat");
            match get_heartbeat(&self.providers, &timespan, &host_name) {
                Ok(entity) => host_entity = entity,
                Err(err) => debug!(host = %host_name, error = %err, "Heartbeat lookup failed"),
            }
        }
        if has("azure_net") {
            output.data_wait("AzureNetworkAnalytics");
            if let Err(err) =
                get_az_net_topology(&self.providers, &timespan, &mut host_entity, &host_name)
            {
                debug!(host = %host_name, error = %err, "Network topology lookup failed");
            }
        }
        if has("azure_api") && host_entity.is_azure() {
            if let Some(provider) = self.providers.azure_data() {
                if let Some(details) =
                    azure_api_details(provider.as_ref(), &mut self.azure_cache, &host_entity)
                {
                    if let Some(azure) = host_entity.azure.as_mut() {
                        azure.subscription_details = Some(details.subscription_details);
                        azure.resource_details = Some(details.resource_details);
                    }
                }
            }
        }

        if has("ti") {
            if let Some(provider) = self.providers.ti_lookup() {
                output.data_wait("Threat intelligence");
                if let Some(ti) =
                    ti_results_for_host(provider.as_ref(), &mut self.ti_cache, &host_entity)
                {
                    result.set_table("ti_results", ti);
                }
            }
        }

        output.markdown(&format!("Host: {host_name}"));
        result.set_entity("host_entity", Entity::Host(host_entity));

        if has("alerts") {
            output.data_wait("Related alerts");
            match fetch_related_alerts(
                &self.providers,
                &mut self.alert_cache,
                &output,
                &timespan,
                "host_name",
                &host_name,
            ) {
                Ok(alerts) => {
                    if !alerts.is_empty() {
                        if let Some(plot) = alert_timeline(&output, &alerts) {
                            result.set_timeline("alert_timeline", plot);
                        }
                    }
                    result.set_table("related_alerts", alerts);
                }
                Err(err) => {
                    debug!(host = %host_name, error = %err, "Related alerts fetch failed")
                }
            }
        }

        if has("bookmarks") {
            match self.fetch_bookmarks(&output, &timespan, &host_name) {
                Ok(bookmarks) => result.set_table("related_bookmarks", bookmarks),
                Err(err) => debug!(host = %host_name, error = %err, "Bookmark fetch failed"),
            }
        }

        self.last_result = Some(result.clone());
        Ok(result)
    }

    fn last_result(&self) -> Option<&NotebookletResult> {
        self.last_result.as_ref()
    }
}
