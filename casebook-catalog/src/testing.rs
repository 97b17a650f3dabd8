//! Shared fixtures for the catalog unit tests.

use casebook_core::notebooklet::{
    Notebooklet, NotebookletMetadata, NotebookletResult, RunRequest,
};
use casebook_core::providers::DataProviders;
use casebook_core::types::EntityType;
use casebook_core::Result;

use crate::scan::Registration;

/// A notebooklet that records nothing and returns an empty result.
pub struct TestNotebooklet {
    metadata: NotebookletMetadata,
    last_result: Option<NotebookletResult>,
}

impl Notebooklet for TestNotebooklet {
    fn metadata(&self) -> &NotebookletMetadata {
        &self.metadata
    }

    fn run(&mut self, request: RunRequest) -> Result<NotebookletResult> {
        let result = NotebookletResult::new(self.metadata.description.clone(), request.timespan);
        self.last_result = Some(result.clone());
        Ok(result)
    }

    fn last_result(&self) -> Option<&NotebookletResult> {
        self.last_result.as_ref()
    }
}

pub fn test_metadata(name: &str, module_path: &str, keywords: &[&str]) -> NotebookletMetadata {
    NotebookletMetadata {
        name: name.into(),
        module_path: module_path.into(),
        description: format!("{name} test notebooklet"),
        category: module_path.split('.').next().unwrap_or("").into(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        entity_types: vec![EntityType::Host],
        options: vec![],
        req_providers: vec![],
    }
}

pub fn test_factory(_providers: &DataProviders) -> Result<Box<dyn Notebooklet>> {
    Ok(Box::new(TestNotebooklet {
        metadata: test_metadata("TestNotebooklet", "test.module", &[]),
        last_result: None,
    }))
}

pub fn registration(name: &str, module_path: &str, keywords: &[&str]) -> Registration {
    Registration {
        metadata: test_metadata(name, module_path, keywords),
        factory: test_factory,
    }
}
