//! Fundamental data types shared across the Casebook crates.
//!
//! Tabular query results ([`TableData`]), the entity model enriched from
//! those results, and the opaque timeline descriptor handed back to the
//! display layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Tabular data returned by query providers.
///
/// Rows hold JSON values positionally aligned with `columns`. Short rows
/// are padded with null and long rows truncated on insert, so a table is
/// always rectangular.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TableData {
    /// Create an empty table with the given column names.
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from column names and rows.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The cell at (row, column name), if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// The cell at (row, column name) as a string, if present and textual.
    pub fn cell_str(&self, row: usize, column: &str) -> Option<&str> {
        self.cell(row, column).and_then(Value::as_str)
    }

    /// All values in a column, in row order.
    pub fn column_values(&self, name: &str) -> Vec<&Value> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Distinct string values in a column, in first-seen order.
    pub fn distinct_strings(&self, name: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for value in self.column_values(name) {
            if let Some(text) = value.as_str() {
                if !seen.iter().any(|s| s == text) {
                    seen.push(text.to_string());
                }
            }
        }
        seen
    }

    /// A new table containing only rows where `predicate` accepts the
    /// value in `column`. A missing column yields an empty table.
    pub fn filter_rows(&self, column: &str, predicate: impl Fn(&Value) -> bool) -> TableData {
        let mut filtered = TableData {
            columns: self.columns.clone(),
            rows: Vec::new(),
        };
        if let Some(idx) = self.column_index(column) {
            for row in &self.rows {
                if row.get(idx).is_some_and(&predicate) {
                    filtered.rows.push(row.clone());
                }
            }
        }
        filtered
    }

    /// Group rows by the string value in `column` and count each group,
    /// ordered by group key.
    pub fn group_count(&self, column: &str) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for value in self.column_values(column) {
            if let Some(text) = value.as_str() {
                *counts.entry(text.to_string()).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    /// A new table keeping only the named columns (those that exist), in
    /// the order given.
    pub fn select(&self, columns: &[&str]) -> TableData {
        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();
        let kept: Vec<String> = indices.iter().map(|&i| self.columns[i].clone()).collect();
        // Rows may be ragged when deserialized; treat short rows as null.
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        TableData { columns: kept, rows }
    }
}

/// Entity kinds a notebooklet can accept as its input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Host,
    Account,
    IpAddress,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Host => "host",
            EntityType::Account => "account",
            EntityType::IpAddress => "ip_address",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain entity carried in a result container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Host(HostEntity),
    Account(AccountEntity),
}

/// A host enriched with attributes from query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostEntity {
    pub host_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// Hosting environment reported by the heartbeat, e.g. "Azure".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureHostData>,
}

impl HostEntity {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            ..Self::default()
        }
    }

    /// Whether the heartbeat identified this host as an Azure resource.
    pub fn is_azure(&self) -> bool {
        self.environment.as_deref() == Some("Azure")
    }

    /// Add an IP address if not already present.
    pub fn add_ip_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        if !self.ip_addresses.contains(&address) {
            self.ip_addresses.push(address);
        }
    }
}

/// Azure resource linkage and API-sourced detail for a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureHostData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_details: Option<Value>,
}

/// An account enriched with attributes from query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountEntity {
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upn: Option<String>,
}

impl AccountEntity {
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            ..Self::default()
        }
    }
}

/// Descriptor for a timeline widget over tabular data.
///
/// The core does not render anything; this is forwarded to the caller's
/// display layer, which decides how to plot it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePlot {
    pub title: String,
    /// Column holding the event timestamp.
    pub time_column: String,
    /// Columns shown for each point.
    pub source_columns: Vec<String>,
    /// Number of plotted events.
    pub points: usize,
}
