//! Output sinks for notebooklet progress and result messages.
//!
//! Notebooklets never print directly: they write through a
//! [`NotebookOutput`], which couples a [`NotebookDisplay`] sink with the
//! session options so `silent`, `verbose`, and `debug` gate what reaches
//! the reader. Rendering of rich artifacts (timelines, entity cards) is
//! the caller's concern; the sink only receives text.

use std::sync::{Arc, Mutex};

use crate::options::SharedOptions;

/// A sink for notebook-directed text output.
pub trait NotebookDisplay: Send + Sync {
    /// Write a markdown fragment.
    fn markdown(&self, text: &str);

    /// Write plain text.
    fn print(&self, text: &str);
}

/// Default sink writing to stdout.
#[derive(Debug, Default)]
pub struct StdoutDisplay;

impl NotebookDisplay for StdoutDisplay {
    fn markdown(&self, text: &str) {
        println!("{text}");
    }

    fn print(&self, text: &str) {
        println!("{text}");
    }
}

/// A sink that drops everything.
#[derive(Debug, Default)]
pub struct NoOpDisplay;

impl NotebookDisplay for NoOpDisplay {
    fn markdown(&self, _text: &str) {}
    fn print(&self, _text: &str) {}
}

/// A sink that records lines, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    lines: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All lines written so far.
    pub fn captured(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.captured().iter().any(|line| line.contains(needle))
    }
}

impl NotebookDisplay for RecordingDisplay {
    fn markdown(&self, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(text.to_string());
        }
    }

    fn print(&self, text: &str) {
        self.markdown(text);
    }
}

/// Option-gated writer used by notebooklets during a run.
#[derive(Clone)]
pub struct NotebookOutput {
    display: Arc<dyn NotebookDisplay>,
    options: SharedOptions,
    /// Per-run silent override, set from the run request.
    run_silent: Option<bool>,
}

impl NotebookOutput {
    pub fn new(display: Arc<dyn NotebookDisplay>, options: SharedOptions) -> Self {
        Self {
            display,
            options,
            run_silent: None,
        }
    }

    /// Override the session `silent` option for one run.
    pub fn with_run_silent(mut self, silent: Option<bool>) -> Self {
        self.run_silent = silent;
        self
    }

    fn silent(&self) -> bool {
        if let Some(run_silent) = self.run_silent {
            return run_silent;
        }
        self.options.read().map(|o| o.silent).unwrap_or(false)
    }

    fn verbose(&self) -> bool {
        self.options.read().map(|o| o.verbose).unwrap_or(true)
    }

    fn debug_enabled(&self) -> bool {
        self.options.read().map(|o| o.debug).unwrap_or(false)
    }

    /// Write markdown unless the run is silent.
    pub fn markdown(&self, text: &str) {
        if !self.silent() {
            self.display.markdown(text);
        }
    }

    /// Write a progress/status line; requires verbose and not silent.
    pub fn status(&self, text: &str) {
        if self.verbose() && !self.silent() {
            self.display.print(text);
        }
    }

    /// Announce a data fetch; requires verbose and not silent.
    pub fn data_wait(&self, source: &str) {
        self.status(&format!("Getting data from {source}..."));
    }

    /// Write a debug line; requires the debug option.
    pub fn debug(&self, text: &str) {
        if self.debug_enabled() {
            self.display.print(text);
        }
    }
}

impl std::fmt::Debug for NotebookOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotebookOutput")
            .field("run_silent", &self.run_silent)
            .finish()
    }
}
