//! Data provider seams and the per-session composition point.
//!
//! Notebooklets never talk to a backend directly: they receive a
//! [`DataProviders`] handle bundling the query provider, optional
//! enrichment providers, the session options, and the display sink.
//! [`StaticQueryProvider`] serves canned tables for tests and demos.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;

use crate::display::{NotebookDisplay, NotebookOutput, StdoutDisplay};
use crate::error::ProviderError;
use crate::options::{NotebookOptions, SharedOptions};
use crate::timespan::Timespan;
use crate::types::TableData;

/// Filter parameters for a named query.
pub type QueryArgs = BTreeMap<String, String>;

/// A provider executing named, time-bounded queries against an analytics
/// store.
pub trait QueryProvider: Send + Sync {
    /// Names of the queries this provider supports.
    fn query_names(&self) -> Vec<String>;

    fn has_query(&self, name: &str) -> bool {
        self.query_names().iter().any(|q| q == name)
    }

    /// Run a named query bounded by `timespan`, filtered by `args`.
    fn run_query(
        &self,
        name: &str,
        timespan: &Timespan,
        args: &QueryArgs,
    ) -> Result<TableData, ProviderError>;
}

/// A provider returning cloud resource metadata from a management API.
/// Absence of this provider is a normal, supported configuration.
pub trait AzureDataProvider: Send + Sync {
    fn subscription_info(&self, subscription_id: &str)
        -> Result<serde_json::Value, ProviderError>;

    fn resource_details(
        &self,
        subscription_id: &str,
        resource_id: &str,
    ) -> Result<serde_json::Value, ProviderError>;
}

/// A provider resolving observables (IP addresses, domains) against
/// threat-intelligence feeds. Like the Azure resource API, this provider
/// is optional and its absence disables the enrichment that needs it.
pub trait TiLookupProvider: Send + Sync {
    /// Look up a batch of observables, returning one table of hits.
    fn lookup_iocs(&self, observables: &[String]) -> Result<TableData, ProviderError>;
}

/// Name of the query provider slot.
pub const PROVIDER_QUERY: &str = "query";
/// Name of the Azure resource API provider slot.
pub const PROVIDER_AZURE_DATA: &str = "azure_data";
/// Name of the threat-intelligence lookup provider slot.
pub const PROVIDER_TI_LOOKUP: &str = "ti_lookup";

const KNOWN_PROVIDERS: &[&str] = &[PROVIDER_QUERY, PROVIDER_AZURE_DATA, PROVIDER_TI_LOOKUP];

/// The injected collaborators for an analysis session.
#[derive(Clone)]
pub struct DataProviders {
    query_provider: Arc<dyn QueryProvider>,
    azure_data: Option<Arc<dyn AzureDataProvider>>,
    ti_lookup: Option<Arc<dyn TiLookupProvider>>,
    options: SharedOptions,
    display: Arc<dyn NotebookDisplay>,
}

impl DataProviders {
    pub fn new(query_provider: Arc<dyn QueryProvider>) -> Self {
        Self {
            query_provider,
            azure_data: None,
            ti_lookup: None,
            options: NotebookOptions::shared(),
            display: Arc::new(StdoutDisplay),
        }
    }

    pub fn with_azure_data(mut self, provider: Arc<dyn AzureDataProvider>) -> Self {
        self.azure_data = Some(provider);
        self
    }

    pub fn with_ti_lookup(mut self, provider: Arc<dyn TiLookupProvider>) -> Self {
        self.ti_lookup = Some(provider);
        self
    }

    pub fn with_options(mut self, options: SharedOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_display(mut self, display: Arc<dyn NotebookDisplay>) -> Self {
        self.display = display;
        self
    }

    pub fn query_provider(&self) -> &Arc<dyn QueryProvider> {
        &self.query_provider
    }

    pub fn azure_data(&self) -> Option<&Arc<dyn AzureDataProvider>> {
        self.azure_data.as_ref()
    }

    pub fn ti_lookup(&self) -> Option<&Arc<dyn TiLookupProvider>> {
        self.ti_lookup.as_ref()
    }

    pub fn options(&self) -> SharedOptions {
        self.options.clone()
    }

    /// An option-gated output writer bound to this session's sink.
    pub fn output(&self) -> NotebookOutput {
        NotebookOutput::new(self.display.clone(), self.options.clone())
    }

    /// Names of the provider slots currently filled.
    pub fn provider_names(&self) -> Vec<&'static str> {
        let mut names = vec![PROVIDER_QUERY];
        if self.azure_data.is_some() {
            names.push(PROVIDER_AZURE_DATA);
        }
        if self.ti_lookup.is_some() {
            names.push(PROVIDER_TI_LOOKUP);
        }
        names
    }

    /// Split a required-provider list into (missing, unknown) names.
    pub fn has_required_providers(&self, required: &[String]) -> (Vec<String>, Vec<String>) {
        let loaded = self.provider_names();
        let mut missing = Vec::new();
        let mut unknown = Vec::new();
        for name in required {
            if !KNOWN_PROVIDERS.contains(&name.as_str()) {
                unknown.push(name.clone());
            } else if !loaded.contains(&name.as_str()) {
                missing.push(name.clone());
            }
        }
        (missing, unknown)
    }

    /// Verify the providers a notebooklet requires. Missing providers are
    /// an error; unknown names in the requirement list are logged only.
    pub fn require(&self, required: &[String], notebooklet: &str) -> Result<(), ProviderError> {
        let (missing, unknown) = self.has_required_providers(required);
        if !unknown.is_empty() {
            warn!(
                notebooklet = %notebooklet,
                providers = ?unknown,
                "Unknown provider names in requirement list"
            );
        }
        if let Some(name) = missing.into_iter().next() {
            return Err(ProviderError::MissingProvider {
                name,
                notebooklet: notebooklet.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DataProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProviders")
            .field("providers", &self.provider_names())
            .finish()
    }
}

/// A query provider serving canned tables, for tests and demos.
///
/// Each query name maps to a table and optionally to a filter: when a
/// registered filter's argument is present in the query args, rows are
/// restricted to those whose column equals the argument value
/// (case-insensitive).
#[derive(Default)]
pub struct StaticQueryProvider {
    tables: HashMap<String, TableData>,
    filters: HashMap<String, (String, String)>,
}

impl StaticQueryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned table for a query name.
    pub fn with_table(mut self, query: &str, table: TableData) -> Self {
        self.tables.insert(query.to_string(), table);
        self
    }

    /// Register a canned table filtered by `arg` against `column`.
    pub fn with_filtered_table(
        mut self,
        query: &str,
        table: TableData,
        arg: &str,
        column: &str,
    ) -> Self {
        self.filters
            .insert(query.to_string(), (arg.to_string(), column.to_string()));
        self.with_table(query, table)
    }
}

impl QueryProvider for StaticQueryProvider {
    fn query_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    fn run_query(
        &self,
        name: &str,
        _timespan: &Timespan,
        args: &QueryArgs,
    ) -> Result<TableData, ProviderError> {
        let table = self
            .tables
            .get(name)
            .ok_or_else(|| ProviderError::UnknownQuery {
                name: name.to_string(),
            })?;
        if let Some((arg, column)) = self.filters.get(name) {
            if let Some(wanted) = args.get(arg) {
                return Ok(table.filter_rows(column, |v| {
                    v.as_str().is_some_and(|s| s.eq_ignore_ascii_case(wanted))
                }));
            }
        }
        Ok(table.clone())
    }
}
