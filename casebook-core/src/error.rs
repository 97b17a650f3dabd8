//! Error types for the Casebook core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering notebooklet runs, data providers, options, timespans, and the
//! catalog.

/// Top-level error type for the Casebook libraries.
#[derive(Debug, thiserror::Error)]
pub enum CasebookError {
    #[error("Notebooklet error: {0}")]
    Notebooklet(#[from] NotebookletError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Option error: {0}")]
    Option(#[from] OptionError),

    #[error("Timespan error: {0}")]
    Timespan(#[from] TimespanError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a notebooklet run.
#[derive(Debug, thiserror::Error)]
pub enum NotebookletError {
    #[error("Required parameter missing: {name}")]
    MissingParameter { name: String },

    #[error("Invalid option list: {reason}")]
    InvalidOptions { reason: String },

    #[error("Unknown result field: {name}")]
    UnknownField { name: String },
}

/// Errors from query and enrichment providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("No data providers have been configured")]
    NotInitialized,

    #[error("Required data provider '{name}' not loaded for {notebooklet}")]
    MissingProvider { name: String, notebooklet: String },

    #[error("Unknown query: {name}")]
    UnknownQuery { name: String },

    #[error("Query '{name}' failed: {message}")]
    QueryFailed { name: String, message: String },

    #[error("Provider '{name}' unavailable: {message}")]
    Unavailable { name: String, message: String },
}

/// Errors from the named-option surface.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    #[error("Unknown option: {name}")]
    UnknownOption { name: String },

    #[error("Invalid value for option '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Errors from timespan construction and parsing.
#[derive(Debug, thiserror::Error)]
pub enum TimespanError {
    #[error("Timespan requires a start or a period")]
    MissingParameter,

    #[error("Could not parse '{value}' as a date/time")]
    InvalidDate { value: String },

    #[error("Could not parse '{value}' as a time period")]
    InvalidPeriod { value: String },
}

/// Errors from notebooklet registration and catalog lookup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Notebooklet already registered: {name}")]
    AlreadyRegistered { name: String },

    #[error("Notebooklet not found: {name}")]
    NotFound { name: String },

    #[error("Invalid registration in module '{module}': {reason}")]
    InvalidRegistration { module: String, reason: String },
}

/// A type alias for results using the top-level `CasebookError`.
pub type Result<T> = std::result::Result<T, CasebookError>;
