//! Free-text search over the catalog's term index.
//!
//! `find` tokenizes a query on whitespace and punctuation, normalizes the
//! tokens like index terms, and counts how many of them hit each
//! registered class. The match count gates inclusion (at least one term
//! must match) and orders the results, ties broken by class name.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use casebook_core::NotebookletMetadata;

use crate::index::{Catalog, TermIndex};

/// One search hit: the catalog entry and how many query terms matched it.
#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub entry: Arc<crate::index::CatalogEntry>,
    pub match_count: usize,
}

/// Split a query into normalized terms on any non-alphanumeric character.
/// Underscores survive so entity-type names like "ip_address" stay whole.
pub(crate) fn tokenize(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(TermIndex::normalize)
        .collect()
}

/// Find notebooklets matching any term of a free-text query.
///
/// A query with no matching terms (or no terms at all) returns an empty
/// vector, never an error. Results are sorted by match count descending,
/// ties by class name ascending.
pub fn find(catalog: &Catalog, query: &str) -> Vec<SearchMatch> {
    let terms = tokenize(query);
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for term in &terms {
        if let Some(classes) = catalog.term_index().classes_for(term) {
            for class in classes {
                *counts.entry(class.clone()).or_insert(0) += 1;
            }
        }
    }
    debug!(query, candidates = counts.len(), "Term search");

    let mut matches: Vec<SearchMatch> = counts
        .into_iter()
        .filter_map(|(name, match_count)| {
            catalog.get(&name).map(|entry| SearchMatch {
                entry: entry.clone(),
                match_count,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.match_count
            .cmp(&a.match_count)
            .then_with(|| a.entry.name().cmp(b.entry.name()))
    });
    matches
}

/// Match a term string against one class's search text.
///
/// Terms are separated by commas or whitespace and may be simple strings
/// or regular expressions; each is matched case-insensitively against the
/// class's declared terms and description. An unparseable pattern falls
/// back to a literal match. Returns whether every term matched and the
/// count of terms that did.
pub fn match_terms(metadata: &NotebookletMetadata, search_terms: &str) -> (bool, usize) {
    let mut search_text = metadata.search_terms().join(" ");
    search_text.push(' ');
    search_text.push_str(&metadata.description);

    let terms: Vec<&str> = search_terms
        .split([',', ' ', '\t', '\n'])
        .filter(|t| !t.is_empty())
        .collect();

    let match_count = terms
        .iter()
        .filter(|term| term_matches(term, &search_text))
        .count();

    (match_count == terms.len() && !terms.is_empty(), match_count)
}

fn term_matches(term: &str, text: &str) -> bool {
    let pattern = regex::RegexBuilder::new(term)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            regex::RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
        });
    match pattern {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_catalog;
    use crate::scan::{discover_modules, NotebookletModule, Registration};
    use crate::testing::{registration, test_metadata};
    use casebook_core::error::CatalogError;

    fn host_module() -> std::result::Result<Vec<Registration>, CatalogError> {
        Ok(vec![registration(
            "HostSummary",
            "host.host_summary",
            &["host", "windows", "linux", "azure", "heartbeat"],
        )])
    }

    fn account_module() -> std::result::Result<Vec<Registration>, CatalogError> {
        Ok(vec![registration(
            "AccountSummary",
            "account.account_summary",
            &["account", "user", "azure"],
        )])
    }

    fn catalog() -> Catalog {
        let manifest = vec![
            NotebookletModule {
                path: "host.host_summary",
                registrations: host_module,
            },
            NotebookletModule {
                path: "account.account_summary",
                registrations: account_module,
            },
        ];
        build_catalog(&discover_modules(&manifest))
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("host, windows-AZURE"),
            vec!["host", "windows", "azure"]
        );
        assert_eq!(tokenize("ip_address"), vec!["ip_address"]);
        assert!(tokenize("  ,;  ").is_empty());
    }

    #[test]
    fn test_find_empty_query() {
        let catalog = catalog();
        assert!(find(&catalog, "").is_empty());
    }

    #[test]
    fn test_find_no_matching_terms() {
        let catalog = catalog();
        assert!(find(&catalog, "monkey stew").is_empty());
    }

    #[test]
    fn test_find_host_windows_azure() {
        let catalog = catalog();
        let results = find(&catalog, "host windows azure");
        assert!(!results.is_empty());
        assert_eq!(results[0].entry.name(), "HostSummary");
        assert_eq!(results[0].match_count, 3);
        // AccountSummary matched only "azure".
        assert_eq!(results[1].entry.name(), "AccountSummary");
        assert_eq!(results[1].match_count, 1);
    }

    #[test]
    fn test_find_tie_broken_by_name() {
        let catalog = catalog();
        let results = find(&catalog, "azure");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].match_count, results[1].match_count);
        assert_eq!(results[0].entry.name(), "AccountSummary");
    }

    #[test]
    fn test_match_terms_all() {
        let meta = test_metadata(
            "HostSummary",
            "host.host_summary",
            &["host", "windows", "linux", "azure"],
        );
        let (all, count) = match_terms(&meta, "host, linux, azure");
        assert!(all);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_match_terms_partial() {
        let meta = test_metadata("HostSummary", "host.host_summary", &["host", "linux"]);
        let (all, count) = match_terms(&meta, "host stew");
        assert!(!all);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_match_terms_regex() {
        let meta = test_metadata("HostSummary", "host.host_summary", &["heartbeat"]);
        let (all, count) = match_terms(&meta, "heart.*t");
        assert!(all);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_match_terms_matches_description() {
        // test_metadata puts the class name in the description.
        let meta = test_metadata("HostSummary", "host.host_summary", &[]);
        let (_, count) = match_terms(&meta, "notebooklet");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_match_terms_empty_input() {
        let meta = test_metadata("HostSummary", "host.host_summary", &["host"]);
        let (all, count) = match_terms(&meta, "");
        assert!(!all);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_match_terms_invalid_regex_falls_back_to_literal() {
        let meta = test_metadata("HostSummary", "host.host_summary", &["c++ host"]);
        let (all, count) = match_terms(&meta, "c++");
        assert!(all);
        assert_eq!(count, 1);
    }
}
