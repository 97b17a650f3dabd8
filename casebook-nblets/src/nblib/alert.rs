//! Related-alert fetching, timeline descriptors, and alert browsing.

use casebook_core::cache::SessionCache;
use casebook_core::display::NotebookOutput;
use casebook_core::error::ProviderError;
use casebook_core::notebooklet::NotebookletResult;
use casebook_core::providers::{DataProviders, QueryArgs};
use casebook_core::timespan::Timespan;
use casebook_core::types::{TableData, TimelinePlot};

use crate::nblib::queries;

/// Cache for related-alert fetches, keyed by entity name and timespan.
pub type AlertCache = SessionCache<(String, Timespan), TableData>;

/// Fetch alerts related to an entity, memoized per (entity, timespan).
///
/// `filter_arg` names the query argument the entity value binds to
/// ("host_name", "account_name"). Messages go through the caller's run
/// output so per-run silencing applies; summaries are written on the
/// first fetch only, cache hits stay quiet.
pub fn fetch_related_alerts(
    providers: &DataProviders,
    cache: &mut AlertCache,
    output: &NotebookOutput,
    timespan: &Timespan,
    filter_arg: &str,
    entity_name: &str,
) -> Result<TableData, ProviderError> {
    cache.get_or_try_insert_with((entity_name.to_string(), *timespan), || {
        let mut args = QueryArgs::new();
        args.insert(filter_arg.to_string(), entity_name.to_string());
        let alerts = providers
            .query_provider()
            .run_query(queries::RELATED_ALERTS, timespan, &args)?;
        if alerts.is_empty() {
            output.markdown("No related alerts found.");
        } else {
            let alert_types = alerts.group_count("AlertName").len();
            output.markdown(&format!(
                "Found {} related alerts ({} alert types)",
                alerts.len(),
                alert_types
            ));
        }
        Ok(alerts)
    })
}

/// Describe a timeline over an alert table, if there is enough to plot.
///
/// A single alert cannot be placed on a timeline; that case and the empty
/// case write a message instead and return `None`.
pub fn alert_timeline(output: &NotebookOutput, alerts: &TableData) -> Option<TimelinePlot> {
    match alerts.len() {
        0 => {
            output.markdown("No alerts available to be plotted.");
            None
        }
        1 => {
            output.markdown("A single alert cannot be plotted on a timeline.");
            None
        }
        points => Some(TimelinePlot {
            title: "Related Alerts".into(),
            time_column: "TimeGenerated".into(),
            source_columns: vec!["AlertName".into(), "TimeGenerated".into()],
            points,
        }),
    }
}

/// A browsable view over the alerts in a result: the columns an analyst
/// scans first, in time order as fetched.
pub fn browse_alerts(result: &NotebookletResult) -> Option<TableData> {
    let alerts = result.table("related_alerts")?;
    if alerts.is_empty() {
        return None;
    }
    Some(alerts.select(&["TimeGenerated", "AlertName", "Severity"]))
}
