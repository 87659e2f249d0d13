//! Application state and main event loop.
//!
//! The Elm shape: [`Model`] holds all state, [`Message`] names every event,
//! [`update`] applies transitions, and [`App::run`] owns the terminal.

mod event_loop;
mod input;
mod model;
mod update;

pub use input::handle_event;
pub use model::{DiagnosticRow, Layout, Model};
pub use update::{update, Message};

use std::collections::HashSet;
use std::path::PathBuf;

use crate::meta::Meta;
use crate::ui::Theme;

/// Owns the launch configuration and runs the event loop.
pub struct App {
    file_path: PathBuf,
    theme: Theme,
    meta: Meta,
    inputs: HashSet<String>,
    operations: HashSet<String>,
}

impl App {
    /// Create an application for the given rules file, validating against
    /// the canonical employee model and the production input/operation
    /// sets.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            theme: Theme::default(),
            meta: Meta::from_schema(&crate::canonical::employee_schema()),
            inputs: crate::canonical::default_inputs(),
            operations: crate::canonical::default_operations(),
        }
    }

    /// Select the color theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Replace the canonical model metadata.
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Replace the input field set.
    pub fn with_inputs(mut self, inputs: HashSet<String>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Replace the operation set.
    pub fn with_operations(mut self, operations: HashSet<String>) -> Self {
        self.operations = operations;
        self
    }
}
