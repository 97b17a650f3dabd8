//! Named options controlling notebooklet output behavior.
//!
//! Three options are defined: `verbose` (progress messages, default on),
//! `debug` (diagnostic output, default off), and `silent` (suppress all
//! notebook output, default off). Options can be read and written by name;
//! unknown names fail with [`OptionError::UnknownOption`].

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::error::OptionError;

/// A shared, session-scoped handle to the option set.
pub type SharedOptions = Arc<RwLock<NotebookOptions>>;

/// The option set for an analysis session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookOptions {
    /// Show progress messages.
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// Show debug output.
    #[serde(default)]
    pub debug: bool,
    /// Suppress all notebook output.
    #[serde(default)]
    pub silent: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotebookOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            debug: false,
            silent: false,
        }
    }
}

/// Documentation for one named option.
#[derive(Debug, Clone, Serialize)]
pub struct OptionInfo {
    pub name: &'static str,
    pub default: bool,
    pub description: &'static str,
}

const OPTION_DOCS: &[OptionInfo] = &[
    OptionInfo {
        name: "verbose",
        default: true,
        description: "Show progress messages.",
    },
    OptionInfo {
        name: "debug",
        default: false,
        description: "Show debug output.",
    },
    OptionInfo {
        name: "silent",
        default: false,
        description: "Suppress all notebook output.",
    },
];

impl NotebookOptions {
    /// Wrap a default option set in a shared handle.
    pub fn shared() -> SharedOptions {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Read an option by name.
    pub fn get_opt(&self, name: &str) -> Result<bool, OptionError> {
        match name {
            "verbose" => Ok(self.verbose),
            "debug" => Ok(self.debug),
            "silent" => Ok(self.silent),
            _ => Err(OptionError::UnknownOption {
                name: name.to_string(),
            }),
        }
    }

    /// Set an option by name.
    pub fn set_opt(&mut self, name: &str, value: bool) -> Result<(), OptionError> {
        match name {
            "verbose" => self.verbose = value,
            "debug" => self.debug = value,
            "silent" => self.silent = value,
            _ => {
                return Err(OptionError::UnknownOption {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Documentation for all defined options.
    pub fn describe() -> &'static [OptionInfo] {
        OPTION_DOCS
    }

    /// Current settings as "name: value" lines.
    pub fn current(&self) -> String {
        OPTION_DOCS
            .iter()
            .map(|info| {
                let value = self.get_opt(info.name).unwrap_or_default();
                format!("{}: {}", info.name, value)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for NotebookOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.current())
    }
}

impl std::fmt::Display for OptionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (default={}): {}",
            self.name, self.default, self.description
        )
    }
}
