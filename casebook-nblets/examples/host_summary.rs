//! Run the HostSummary notebooklet against canned data.
//!
//! ```sh
//! cargo run --example host_summary
//! ```

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use casebook_catalog::{build_catalog, discover_modules, find};
use casebook_core::types::TableData;
use casebook_core::{DataProviders, RunRequest, StaticQueryProvider, Timespan};
use casebook_nblets::manifest;
use casebook_nblets::nblib::queries;

fn canned_provider() -> StaticQueryProvider {
    StaticQueryProvider::new()
        .with_filtered_table(
            queries::HOST_EVENTS,
            TableData::from_rows(
                &["Computer", "EventID"],
                vec![
                    vec![json!("victim00"), json!(4624)],
                    vec![json!("victim00"), json!(4688)],
                ],
            ),
            "host_name",
            "Computer",
        )
        .with_table(
            queries::HEARTBEAT,
            TableData::from_rows(
                &["Computer", "ComputerIP", "OSType", "ComputerEnvironment"],
                vec![vec![
                    json!("victim00"),
                    json!("10.0.0.4"),
                    json!("Linux"),
                    json!("Azure"),
                ]],
            ),
        )
        .with_table(
            queries::AZ_NETWORK_ANALYTICS,
            TableData::from_rows(
                &["PrivateIPAddresses", "PublicIPAddresses"],
                vec![vec![json!("10.0.0.4"), json!("40.1.2.3")]],
            ),
        )
        .with_table(
            queries::RELATED_ALERTS,
            TableData::from_rows(
                &["AlertName", "TimeGenerated", "Severity"],
                vec![
                    vec![
                        json!("Suspicious process launched"),
                        json!("2024-06-01T10:00:00Z"),
                        json!("High"),
                    ],
                    vec![
                        json!("Anomalous logon"),
                        json!("2024-06-01T11:00:00Z"),
                        json!("Medium"),
                    ],
                ],
            ),
        )
        .with_table(
            queries::ENTITY_BOOKMARKS,
            TableData::from_rows(&["BookmarkName"], vec![vec![json!("Check this host")]]),
        )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let catalog = build_catalog(&discover_modules(&manifest()));
    println!("Registered notebooklets:");
    for (name, entry) in catalog.iter_entries() {
        println!("  {} - {}", name, entry.metadata.description);
    }

    println!("\nSearch for 'host windows azure':");
    for hit in find(&catalog, "host windows azure") {
        println!("  {} ({} terms matched)", hit.entry.name(), hit.match_count);
    }

    let providers = DataProviders::new(Arc::new(canned_provider()));
    let mut nb = catalog.create("HostSummary", &providers)?;
    let result = nb.run(
        RunRequest::new()
            .with_value("victim00")
            .with_timespan(Timespan::last(chrono::Duration::days(7))),
    )?;

    println!("\n{result}");
    Ok(())
}
