#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::return_self_not_must_use,
    clippy::should_implement_trait,
    clippy::match_same_arms,
    clippy::collapsible_if,
    clippy::collapsible_else_if,
    clippy::len_without_is_empty,
    clippy::uninlined_format_args
)]

//! # Rulepad
//!
//! A terminal editor for the payroll mapping-rule language.
//!
//! Every keystroke re-runs the full analysis pipeline (tokenize, parse,
//! complete) over the edited buffer, so syntax coloring, diagnostics and
//! completion candidates are always current.
//!
//! ## Modules
//!
//! - [`content`]: the editable character grid, wrapping, text streaming
//! - [`tokenizer`]: lexing the grid into typed tokens
//! - [`meta`]: the flattened canonical model and path lookups
//! - [`canonical`]: the employee schema and production name sets
//! - [`parser`]: rule segmentation, validation, diagnostics
//! - [`completion`]: cursor-position completion candidates
//! - [`ui`]: panes, themes, frame painting
//! - [`app`]: application state and the event loop

pub mod app;
pub mod canonical;
pub mod completion;
pub mod config;
pub mod content;
pub mod meta;
pub mod parser;
pub mod tokenizer;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::completion::{completions_at, CompletionList};
    pub use crate::content::Content;
    pub use crate::meta::Meta;
    pub use crate::parser::Parser;
    pub use crate::tokenizer::{tokenize, tokenize_str};
}
