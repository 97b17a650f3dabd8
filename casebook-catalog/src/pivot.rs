//! Entity pivots: run a notebooklet directly from an entity value.
//!
//! A pivot wraps a registered class behind a snake_case function name
//! (`HostSummary` becomes `host_summary`) and injects the current
//! timespan from a caller-supplied source, so an analysis session can
//! invoke a notebooklet from an entity without assembling a request by
//! hand. Classes that declare no mapped entity types get no pivot.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use casebook_core::error::CatalogError;
use casebook_core::notebooklet::{NotebookletResult, RunRequest};
use casebook_core::providers::DataProviders;
use casebook_core::timespan::Timespan;
use casebook_core::types::EntityType;
use casebook_core::Result;

use crate::index::{Catalog, CatalogEntry};

/// Supplies the session's current timespan when a pivot runs.
pub type TimespanSource = Arc<dyn Fn() -> Timespan + Send + Sync>;

/// Entity attribute used as the pivot input value for each entity type.
fn entity_value_attr(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Host => "HostName",
        EntityType::Account => "Name",
        EntityType::IpAddress => "Address",
    }
}

/// Derive a pivot function name from a class name: "HostSummary" becomes
/// "host_summary".
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// One pivotable notebooklet: its function name, the entity attributes it
/// accepts, and the catalog entry it wraps.
#[derive(Debug, Clone)]
pub struct PivotFunction {
    name: String,
    entity_attrs: BTreeMap<EntityType, &'static str>,
    entry: Arc<CatalogEntry>,
}

impl PivotFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity types this pivot accepts, with the entity attribute feeding
    /// the input value.
    pub fn entity_attrs(&self) -> &BTreeMap<EntityType, &'static str> {
        &self.entity_attrs
    }

    pub fn class_name(&self) -> &str {
        self.entry.name()
    }
}

/// The pivot functions built from a catalog, keyed by function name.
pub struct PivotSet {
    functions: BTreeMap<String, PivotFunction>,
    timespan_source: TimespanSource,
}

impl PivotSet {
    pub fn get(&self, name: &str) -> Option<&PivotFunction> {
        self.functions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Run a pivot by function name against an entity value, injecting the
    /// session timespan.
    pub fn run(
        &self,
        name: &str,
        providers: &DataProviders,
        value: &str,
    ) -> Result<NotebookletResult> {
        let function = self.functions.get(name).ok_or(CatalogError::NotFound {
            name: name.to_string(),
        })?;
        let timespan = (self.timespan_source)();
        debug!(pivot = name, class = function.class_name(), "Running pivot");
        let mut notebooklet = function.entry.create(providers)?;
        notebooklet.run(
            RunRequest::new()
                .with_value(value)
                .with_timespan(timespan),
        )
    }
}

impl std::fmt::Debug for PivotSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PivotSet")
            .field("functions", &self.functions.keys())
            .finish()
    }
}

/// Build pivot functions for every catalog class with mapped entity types.
pub fn build_pivots(catalog: &Catalog, timespan_source: TimespanSource) -> PivotSet {
    let mut functions = BTreeMap::new();
    for (_, entry) in catalog.iter_entries() {
        let entity_attrs: BTreeMap<EntityType, &'static str> = entry
            .metadata
            .entity_types
            .iter()
            .map(|entity| (*entity, entity_value_attr(*entity)))
            .collect();
        if entity_attrs.is_empty() {
            continue;
        }
        let name = to_snake_case(entry.name());
        functions.insert(
            name.clone(),
            PivotFunction {
                name,
                entity_attrs,
                entry: entry.clone(),
            },
        );
    }
    PivotSet {
        functions,
        timespan_source,
    }
}
