//! Module scanning over an explicit registration manifest.
//!
//! Notebooklet modules do not get discovered by filesystem or symbol
//! introspection: each module declares itself in a static manifest as a
//! dotted path plus a registration supplier. Scanning walks the manifest,
//! collects registrations, validates them, and skips anything malformed
//! with a warning — a bad module never aborts the scan.

use tracing::{debug, warn};

use casebook_core::error::CatalogError;
use casebook_core::notebooklet::Notebooklet;
use casebook_core::providers::DataProviders;
use casebook_core::NotebookletMetadata;
use casebook_core::Result;

/// Constructor for a notebooklet instance bound to a provider set.
pub type NotebookletFactory = fn(&DataProviders) -> Result<Box<dyn Notebooklet>>;

/// One notebooklet class offered by a module: its declared metadata plus
/// a factory.
#[derive(Clone)]
pub struct Registration {
    pub metadata: NotebookletMetadata,
    pub factory: NotebookletFactory,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.metadata.name)
            .field("module_path", &self.metadata.module_path)
            .finish()
    }
}

/// A manifest entry: a module path and its registration supplier.
///
/// The supplier may fail (the analog of a module import error); failures
/// are logged and the module is skipped.
#[derive(Clone)]
pub struct NotebookletModule {
    /// Dotted module path, e.g. "host.host_summary".
    pub path: &'static str,
    pub registrations: fn() -> std::result::Result<Vec<Registration>, CatalogError>,
}

/// The flat output of a manifest scan: qualified names with their
/// registrations, in manifest order.
#[derive(Debug, Default)]
pub struct ScanOutput {
    entries: Vec<(String, Registration)>,
}

impl ScanOutput {
    pub fn entries(&self) -> &[(String, Registration)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scan a manifest of notebooklet modules.
///
/// Registrations are accepted only when the metadata names the module it
/// is declared in; a registration surfacing through some other module
/// (a re-export) is skipped so a class registers exactly once. Duplicate
/// qualified names and malformed metadata are skipped with a warning.
pub fn discover_modules(manifest: &[NotebookletModule]) -> ScanOutput {
    let mut output = ScanOutput::default();

    for module in manifest {
        let registrations = match (module.registrations)() {
            Ok(regs) => regs,
            Err(err) => {
                warn!(module = module.path, error = %err, "Skipping notebooklet module");
                continue;
            }
        };

        for registration in registrations {
            if let Err(err) = validate(module.path, &registration) {
                warn!(module = module.path, error = %err, "Skipping registration");
                continue;
            }
            let qualified = registration.metadata.qualified_name();
            if output.entries.iter().any(|(name, _)| name == &qualified) {
                warn!(name = %qualified, "Duplicate registration skipped");
                continue;
            }
            debug!(name = %qualified, "Discovered notebooklet");
            output.entries.push((qualified, registration));
        }
    }

    output
}

fn validate(
    module_path: &str,
    registration: &Registration,
) -> std::result::Result<(), CatalogError> {
    let metadata = &registration.metadata;
    if metadata.name.trim().is_empty() {
        return Err(CatalogError::InvalidRegistration {
            module: module_path.to_string(),
            reason: "empty notebooklet name".into(),
        });
    }
    if metadata.module_path != module_path {
        return Err(CatalogError::InvalidRegistration {
            module: module_path.to_string(),
            reason: format!(
                "'{}' is declared in module '{}', not here",
                metadata.name, metadata.module_path
            ),
        });
    }
    Ok(())
}
