//! The notebooklet execution surface: declared metadata, run requests,
//! option resolution, and the result container.
//!
//! A notebooklet is a packaged, parameterized analysis unit. Its metadata
//! is declared explicitly at registration time (never parsed from
//! documentation) and is the sole source for catalog indexing and keyword
//! search. `run` consumes a [`RunRequest`] and produces a
//! [`NotebookletResult`]: a bag of named, independently optional fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{NotebookletError, Result};
use crate::timespan::Timespan;
use crate::types::{Entity, EntityType, TableData, TimelinePlot};

/// Documentation for one run option of a notebooklet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDoc {
    pub name: String,
    pub description: String,
    /// Whether this option is part of the default set.
    pub default: bool,
}

impl OptionDoc {
    pub fn new(name: &str, description: &str, default: bool) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            default,
        }
    }
}

/// Declared metadata for a notebooklet class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookletMetadata {
    /// Short class name, e.g. "HostSummary".
    pub name: String,
    /// Dotted module path, e.g. "host.host_summary".
    pub module_path: String,
    pub description: String,
    /// Grouping label, e.g. "host".
    pub category: String,
    /// Search keywords.
    pub keywords: Vec<String>,
    /// Entity types this notebooklet accepts as its input value.
    pub entity_types: Vec<EntityType>,
    /// Supported run options.
    pub options: Vec<OptionDoc>,
    /// Names of data providers this notebooklet requires.
    pub req_providers: Vec<String>,
}

impl NotebookletMetadata {
    /// Fully qualified name: module path plus class name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module_path, self.name)
    }

    /// Names of all supported options.
    pub fn all_options(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }

    /// Names of the default option set.
    pub fn default_options(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.default)
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Terms this notebooklet is indexed and searched under: its name,
    /// keywords, and entity types, lower-cased.
    pub fn search_terms(&self) -> Vec<String> {
        let mut terms = vec![self.name.to_lowercase()];
        terms.extend(self.keywords.iter().map(|k| k.trim().to_lowercase()));
        terms.extend(self.entity_types.iter().map(|e| e.as_str().to_string()));
        terms
    }

    /// One-line-per-option documentation.
    pub fn options_doc(&self) -> String {
        self.options
            .iter()
            .map(|o| {
                let marker = if o.default { " (default)" } else { "" };
                format!("{}{}: {}", o.name, marker, o.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for NotebookletMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({})", self.name, self.qualified_name())?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "keywords: {}", self.keywords.join(", "))?;
        writeln!(
            f,
            "entity types: {}",
            self.entity_types
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        write!(f, "options:\n{}", self.options_doc())
    }
}

/// Parameters for one notebooklet run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// The value to process, e.g. a host name.
    pub value: Option<String>,
    /// Pre-fetched input data, for notebooklets that accept it.
    pub data: Option<TableData>,
    /// Time range bounding all queries in the run.
    pub timespan: Option<Timespan>,
    /// Requested options; `None` means the default set. Names prefixed
    /// with `+`/`-` add to or remove from the defaults.
    pub options: Option<Vec<String>>,
    /// Per-run override of the session `silent` option.
    pub silent: Option<bool>,
}

impl RunRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_data(mut self, data: TableData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_timespan(mut self, timespan: Timespan) -> Self {
        self.timespan = Some(timespan);
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }
}

/// Resolve a requested option list against a notebooklet's metadata.
///
/// `None` yields the default set. A list of `+name`/`-name` entries
/// adjusts the default set; a list of plain names replaces it. Mixing the
/// two forms is an error. Unknown option names are logged and ignored.
/// The result is ordered by the metadata's option declaration order.
pub fn resolve_options(
    metadata: &NotebookletMetadata,
    requested: Option<&[String]>,
) -> std::result::Result<Vec<String>, NotebookletError> {
    let all: Vec<&str> = metadata.all_options();
    let requested = match requested {
        None => return Ok(metadata.default_options().iter().map(|s| s.to_string()).collect()),
        Some(r) => r,
    };

    let mut add = Vec::new();
    let mut sub = Vec::new();
    let mut plain = Vec::new();
    for opt in requested {
        if let Some(name) = opt.strip_prefix('+') {
            add.push(name);
        } else if let Some(name) = opt.strip_prefix('-') {
            sub.push(name);
        } else {
            plain.push(opt.as_str());
        }
    }

    if !plain.is_empty() && (!add.is_empty() || !sub.is_empty()) {
        return Err(NotebookletError::InvalidOptions {
            reason: "cannot mix a plain option list with +/- adjustments".into(),
        });
    }

    let mut invalid: Vec<&str> = Vec::new();
    for name in add.iter().chain(sub.iter()).chain(plain.iter()) {
        if !all.contains(name) {
            invalid.push(*name);
        }
    }
    if !invalid.is_empty() {
        warn!(
            notebooklet = %metadata.name,
            options = ?invalid,
            "Ignoring invalid options"
        );
    }

    let selected: Vec<&str> = if !plain.is_empty() {
        plain.into_iter().filter(|o| all.contains(o)).collect()
    } else {
        let defaults = metadata.default_options();
        all.iter()
            .filter(|name| {
                let in_default = defaults.contains(name);
                let added = add.contains(name);
                let removed = sub.contains(name);
                (in_default || added) && !removed
            })
            .copied()
            .collect()
    };

    // Order by declaration order for determinism.
    Ok(all
        .iter()
        .filter(|name| selected.contains(name))
        .map(|s| s.to_string())
        .collect())
}

/// One named field of a result container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultField {
    Table(TableData),
    Entity(Entity),
    Timeline(TimelinePlot),
    Text(String),
}

impl ResultField {
    fn summary(&self) -> String {
        match self {
            ResultField::Table(t) => format!("Table ({} rows)", t.len()),
            ResultField::Entity(Entity::Host(h)) => format!("Host entity '{}'", h.host_name),
            ResultField::Entity(Entity::Account(a)) => {
                format!("Account entity '{}'", a.account_name)
            }
            ResultField::Timeline(t) => format!("Timeline '{}' ({} points)", t.title, t.points),
            ResultField::Text(t) => t.clone(),
        }
    }
}

/// The output of one notebooklet run: a bag of named, independently
/// optional fields, plus any user-facing messages accumulated during the
/// run. Owned exclusively by the run that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookletResult {
    pub description: String,
    pub timespan: Option<Timespan>,
    fields: BTreeMap<String, ResultField>,
    messages: Vec<String>,
}

impl NotebookletResult {
    pub fn new(description: impl Into<String>, timespan: Option<Timespan>) -> Self {
        Self {
            description: description.into(),
            timespan,
            fields: BTreeMap::new(),
            messages: Vec::new(),
        }
    }

    pub fn set_table(&mut self, name: &str, table: TableData) {
        self.fields.insert(name.to_string(), ResultField::Table(table));
    }

    pub fn set_entity(&mut self, name: &str, entity: Entity) {
        self.fields
            .insert(name.to_string(), ResultField::Entity(entity));
    }

    pub fn set_timeline(&mut self, name: &str, timeline: TimelinePlot) {
        self.fields
            .insert(name.to_string(), ResultField::Timeline(timeline));
    }

    pub fn set_text(&mut self, name: &str, text: impl Into<String>) {
        self.fields
            .insert(name.to_string(), ResultField::Text(text.into()));
    }

    pub fn field(&self, name: &str) -> Option<&ResultField> {
        self.fields.get(name)
    }

    pub fn table(&self, name: &str) -> Option<&TableData> {
        match self.fields.get(name) {
            Some(ResultField::Table(t)) => Some(t),
            _ => None,
        }
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        match self.fields.get(name) {
            Some(ResultField::Entity(e)) => Some(e),
            _ => None,
        }
    }

    pub fn timeline(&self, name: &str) -> Option<&TimelinePlot> {
        match self.fields.get(name) {
            Some(ResultField::Timeline(t)) => Some(t),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(ResultField::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Names of all populated fields, in sorted order.
    pub fn properties(&self) -> Vec<&str> {
        self.fields.keys().map(|k| k.as_str()).collect()
    }

    /// Look up a field or fail with an unknown-field error.
    pub fn require_field(&self, name: &str) -> Result<&ResultField> {
        self.fields
            .get(name)
            .ok_or_else(|| {
                NotebookletError::UnknownField {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Record a user-facing message produced during the run.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl std::fmt::Display for NotebookletResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.description)?;
        for (name, field) in &self.fields {
            writeln!(f, "{}: {}", name, field.summary())?;
        }
        for message in &self.messages {
            writeln!(f, "note: {message}")?;
        }
        Ok(())
    }
}

/// A packaged, parameterized analysis unit.
pub trait Notebooklet: Send {
    /// The declared metadata for this notebooklet.
    fn metadata(&self) -> &NotebookletMetadata;

    /// Execute the analysis and populate a result container.
    fn run(&mut self, request: RunRequest) -> Result<NotebookletResult>;

    /// The result of the most recent run, if any.
    fn last_result(&self) -> Option<&NotebookletResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostEntity;

    fn sample_metadata() -> NotebookletMetadata {
        NotebookletMetadata {
            name: "HostSummary".into(),
            module_path: "host.host_summary".into(),
            description: "Summarizes host activity".into(),
            category: "host".into(),
            keywords: vec!["host".into(), " Linux ".into(), "azure".into()],
            entity_types: vec![EntityType::Host],
            options: vec![
                OptionDoc::new("heartbeat", "Heartbeat record", true),
                OptionDoc::new("alerts", "Related alerts", true),
                OptionDoc::new("azure_api", "Azure resource details", false),
            ],
            req_providers: vec!["query".into()],
        }
    }

    #[test]
    fn test_qualified_name() {
        let meta = sample_metadata();
        assert_eq!(meta.qualified_name(), "host.host_summary.HostSummary");
    }

    #[test]
    fn test_search_terms_normalized() {
        let terms = sample_metadata().search_terms();
        assert!(terms.contains(&"hostsummary".to_string()));
        assert!(terms.contains(&"linux".to_string()));
        assert!(terms.contains(&"host".to_string()));
    }

    #[test]
    fn test_default_and_all_options() {
        let meta = sample_metadata();
        assert_eq!(meta.all_options(), vec!["heartbeat", "alerts", "azure_api"]);
        assert_eq!(meta.default_options(), vec!["heartbeat", "alerts"]);
    }

    #[test]
    fn test_resolve_options_defaults() {
        let meta = sample_metadata();
        let resolved = resolve_options(&meta, None).unwrap();
        assert_eq!(resolved, vec!["heartbeat", "alerts"]);
    }

    #[test]
    fn test_resolve_options_plain_list() {
        let meta = sample_metadata();
        let requested = vec!["azure_api".to_string()];
        let resolved = resolve_options(&meta, Some(&requested)).unwrap();
        assert_eq!(resolved, vec!["azure_api"]);
    }

    #[test]
    fn test_resolve_options_add_remove() {
        let meta = sample_metadata();
        let requested = vec!["+azure_api".to_string(), "-alerts".to_string()];
        let resolved = resolve_options(&meta, Some(&requested)).unwrap();
        assert_eq!(resolved, vec!["heartbeat", "azure_api"]);
    }

    #[test]
    fn test_resolve_options_mixed_fails() {
        let meta = sample_metadata();
        let requested = vec!["heartbeat".to_string(), "+azure_api".to_string()];
        let result = resolve_options(&meta, Some(&requested));
        assert!(matches!(
            result,
            Err(NotebookletError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_resolve_options_unknown_ignored() {
        let meta = sample_metadata();
        let requested = vec!["heartbeat".to_string(), "bogus".to_string()];
        let resolved = resolve_options(&meta, Some(&requested)).unwrap();
        assert_eq!(resolved, vec!["heartbeat"]);
    }

    #[test]
    fn test_result_fields() {
        let mut result = NotebookletResult::new("test", None);
        result.set_entity("host_entity", Entity::Host(HostEntity::new("victim00")));
        result.set_table("related_alerts", TableData::new(&["AlertName"]));
        result.add_message("a note");

        assert_eq!(result.properties(), vec!["host_entity", "related_alerts"]);
        assert!(result.entity("host_entity").is_some());
        assert!(result.table("related_alerts").is_some());
        assert!(result.table("host_entity").is_none());
        assert_eq!(result.messages(), &["a note".to_string()]);
    }

    #[test]
    fn test_result_require_field() {
        let result = NotebookletResult::new("test", None);
        let err = result.require_field("nothing").unwrap_err();
        assert!(err.to_string().contains("Unknown result field"));
    }

    #[test]
    fn test_result_display() {
        let mut result = NotebookletResult::new("Host summary", None);
        result.set_table("related_alerts", TableData::new(&["AlertName"]));
        let text = result.to_string();
        assert!(text.contains("Host summary"));
        assert!(text.contains("related_alerts: Table (0 rows)"));
    }

    #[test]
    fn test_run_request_builder() {
        let request = RunRequest::new()
            .with_value("victim00")
            .with_options(&["+azure_api"])
            .with_silent(true);
        assert_eq!(request.value.as_deref(), Some("victim00"));
        assert_eq!(request.silent, Some(true));
        assert_eq!(request.options.as_deref(), Some(&["+azure_api".to_string()][..]));
    }
}
