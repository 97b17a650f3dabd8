//! # Casebook Core
//!
//! Core library for Casebook notebooklets: reusable, parameterized
//! security-analysis units. Provides the notebooklet trait and metadata,
//! the result container, timespans, tabular data and entities, data
//! provider seams, session options, output sinks, and the session cache.

pub mod cache;
pub mod display;
pub mod error;
pub mod notebooklet;
pub mod options;
pub mod providers;
pub mod timespan;
pub mod types;

// Re-export commonly used types at the crate root.
pub use cache::{CacheMetrics, SessionCache};
pub use display::{NotebookDisplay, NotebookOutput, RecordingDisplay, StdoutDisplay};
pub use error::{CasebookError, CatalogError, NotebookletError, ProviderError, Result};
pub use notebooklet::{
    resolve_options, Notebooklet, NotebookletMetadata, NotebookletResult, OptionDoc, ResultField,
    RunRequest,
};
pub use options::{NotebookOptions, SharedOptions};
pub use providers::{
    AzureDataProvider, DataProviders, QueryArgs, QueryProvider, StaticQueryProvider,
    TiLookupProvider, PROVIDER_AZURE_DATA, PROVIDER_QUERY, PROVIDER_TI_LOOKUP,
};
pub use timespan::Timespan;
pub use types::{
    AccountEntity, AzureHostData, Entity, EntityType, HostEntity, TableData, TimelinePlot,
};
