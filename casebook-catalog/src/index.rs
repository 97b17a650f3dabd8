//! The catalog: registry, nested namespace, and term index built from a
//! manifest scan.
//!
//! Building is idempotent — the same scan output always yields the same
//! registry keys and term mappings — and a rebuild replaces the catalog
//! wholesale. After construction the catalog is read-only and safe to
//! share behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

use casebook_core::error::CatalogError;
use casebook_core::notebooklet::Notebooklet;
use casebook_core::providers::DataProviders;
use casebook_core::NotebookletMetadata;
use casebook_core::Result;

use crate::scan::{NotebookletFactory, ScanOutput};

/// A registered notebooklet class: declared metadata plus its factory.
pub struct CatalogEntry {
    pub metadata: NotebookletMetadata,
    factory: NotebookletFactory,
}

impl CatalogEntry {
    /// Construct a notebooklet instance bound to `providers`.
    pub fn create(&self, providers: &DataProviders) -> Result<Box<dyn Notebooklet>> {
        (self.factory)(providers)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.metadata.name)
            .field("module_path", &self.metadata.module_path)
            .finish()
    }
}

/// One node of the namespace tree mirroring the module hierarchy, so a
/// class is addressable by its dotted path.
#[derive(Debug, Default)]
pub struct CatalogNode {
    children: BTreeMap<String, CatalogNode>,
    entries: BTreeMap<String, Arc<CatalogEntry>>,
}

impl CatalogNode {
    pub fn child(&self, segment: &str) -> Option<&CatalogNode> {
        self.children.get(segment)
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.keys().map(|k| k.as_str()).collect()
    }

    /// Classes registered directly at this node.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Arc<CatalogEntry>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn entry(&self, name: &str) -> Option<&Arc<CatalogEntry>> {
        self.entries.get(name)
    }

    fn insert(&mut self, segments: &[&str], name: &str, entry: Arc<CatalogEntry>) {
        match segments {
            [] => {
                self.entries.insert(name.to_string(), entry);
            }
            [head, rest @ ..] => self
                .children
                .entry(head.to_string())
                .or_default()
                .insert(rest, name, entry),
        }
    }
}

/// Keyword-to-notebooklet lookup built from declared metadata.
///
/// Terms are lower-cased and trimmed before insertion; every declared
/// term of every registered class appears as a key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TermIndex {
    terms: BTreeMap<String, BTreeSet<String>>,
}

impl TermIndex {
    /// Normalize a term the same way for indexing and lookup.
    pub fn normalize(term: &str) -> String {
        term.trim().to_lowercase()
    }

    fn insert(&mut self, term: &str, class_name: &str) {
        let normalized = Self::normalize(term);
        if normalized.is_empty() {
            return;
        }
        self.terms
            .entry(normalized)
            .or_default()
            .insert(class_name.to_string());
    }

    /// Class names indexed under a term.
    pub fn classes_for(&self, term: &str) -> Option<&BTreeSet<String>> {
        self.terms.get(&Self::normalize(term))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The in-memory catalog of registered notebooklet classes.
#[derive(Debug, Default)]
pub struct Catalog {
    by_name: BTreeMap<String, Arc<CatalogEntry>>,
    root: CatalogNode,
    term_index: TermIndex,
}

impl Catalog {
    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Look up a class by its short name.
    pub fn get(&self, name: &str) -> Option<&Arc<CatalogEntry>> {
        self.by_name.get(name)
    }

    /// Look up a class by dotted path, e.g. "host.host_summary.HostSummary".
    pub fn entry_at(&self, path: &str) -> Option<&Arc<CatalogEntry>> {
        let mut segments: Vec<&str> = path.split('.').collect();
        let name = segments.pop()?;
        let mut node = &self.root;
        for segment in segments {
            node = node.child(segment)?;
        }
        node.entry(name)
    }

    /// The root of the namespace tree.
    pub fn root(&self) -> &CatalogNode {
        &self.root
    }

    /// All registered classes, ordered by name.
    pub fn iter_entries(&self) -> impl Iterator<Item = (&str, &Arc<CatalogEntry>)> {
        self.by_name.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn term_index(&self) -> &TermIndex {
        &self.term_index
    }

    /// Construct an instance of a registered class by short name.
    pub fn create(&self, name: &str, providers: &DataProviders) -> Result<Box<dyn Notebooklet>> {
        let entry = self.by_name.get(name).ok_or(CatalogError::NotFound {
            name: name.to_string(),
        })?;
        entry.create(providers)
    }
}

/// Build a catalog from scan output.
///
/// Short-name collisions keep the first registration and skip the rest
/// with a warning, so repeated builds from the same scan output always
/// produce the same catalog.
pub fn build_catalog(scan: &ScanOutput) -> Catalog {
    let mut catalog = Catalog::default();

    for (qualified, registration) in scan.entries() {
        let name = registration.metadata.name.clone();
        if catalog.by_name.contains_key(&name) {
            warn!(name = %qualified, "Short name collision, keeping first registration");
            continue;
        }
        let entry = Arc::new(CatalogEntry {
            metadata: registration.metadata.clone(),
            factory: registration.factory,
        });

        let segments: Vec<&str> = registration.metadata.module_path.split('.').collect();
        catalog.root.insert(&segments, &name, entry.clone());

        for term in registration.metadata.search_terms() {
            catalog.term_index.insert(&term, &name);
        }
        catalog.by_name.insert(name, entry);
    }

    info!(notebooklets = catalog.len(), "Catalog built");
    catalog
}
