//! Summarize activity for an account: recent logon events and related
//! alerts over the query timespan.

use tracing::debug;

use casebook_core::error::{NotebookletError, ProviderError};
use casebook_core::notebooklet::{
    resolve_options, Notebooklet, NotebookletMetadata, NotebookletResult, OptionDoc, RunRequest,
};
use casebook_core::providers::{DataProviders, QueryArgs, PROVIDER_QUERY};
use casebook_core::timespan::Timespan;
use casebook_core::types::{AccountEntity, Entity, EntityType, TableData};
use casebook_core::Result;

use crate::nblib::alert::{alert_timeline, fetch_related_alerts, AlertCache};
use crate::nblib::queries;

/// Construct an [`AccountSummary`] bound to a provider set.
pub fn factory(providers: &DataProviders) -> Result<Box<dyn Notebooklet>> {
    Ok(Box::new(AccountSummary::new(providers)?))
}

/// Account summary notebooklet.
pub struct AccountSummary {
    metadata: NotebookletMetadata,
    providers: DataProviders,
    alert_cache: AlertCache,
    last_result: Option<NotebookletResult>,
}

impl AccountSummary {
    pub fn declared_metadata() -> NotebookletMetadata {
        NotebookletMetadata {
            name: "AccountSummary".into(),
            module_path: "account.account_summary".into(),
            description: "Account summary: recent logons and related alerts \
                          for an account"
                .into(),
            category: "account".into(),
            keywords: [
                "account",
                "user",
                "logon",
                "signin",
                "azure",
                "active_directory",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            entity_types: vec![EntityType::Account],
            options: vec![
                OptionDoc::new("logons", "Query recent logon events for the account.", true),
                OptionDoc::new("alerts", "Query alerts related to the account.", true),
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
            last_result: None,
        })
    }

    /// Drop all memoized fetches so the next run hits the providers.
    pub fn reset_cache(&mut self) {
        self.alert_cache.clear();
    }

    fn fetch_logons(
        &self,
        timespan: &Timespan,
        account_name: &str,
    ) -> std::result::Result<TableData, ProviderError> {
        let mut args = QueryArgs::new();
        args.insert("account_name".into(), account_name.to_string());
        self.providers
            .query_provider()
            .run_query(queries::ACCOUNT_LOGONS, timespan, &args)
    }
}

impl Notebooklet for AccountSummary {
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
        let account_name = value.to_string();

        output.markdown(&format!("Account: {account_name}"));
        result.set_entity(
            "account_entity",
            Entity::Account(AccountEntity::new(&account_name)),
        );

        if has("logons") {
            output.data_wait("Account logons");
            match self.fetch_logons(&timespan, &account_name) {
                Ok(logons) => {
                    if logons.is_empty() {
                        output.markdown("No logon events found.");
                    } else {
                        output.markdown(&format!("Found {} logon events.", logons.len()));
                    }
                    result.set_table("account_logons", logons);
                }
                Err(err) => {
                    debug!(account = %account_name, error = %err, "Logon fetch failed")
                }
            }
        }

        if has("alerts") {
            output.data_wait("Related alerts");
            match fetch_related_alerts(
                &self.providers,
                &mut self.alert_cache,
                &output,
                &timespan,
                "account_name",
                &account_name,
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
                    debug!(account = %account_name, error = %err, "Related alerts fetch failed")
                }
            }
        }

        self.last_result = Some(result.clone());
        Ok(result)
    }

    fn last_result(&self) -> Option<&NotebookletResult> {
        self.last_result.as_ref()
    }
}
