//! Error types for prompty.
//!
//! Uses thiserror for derive macros. Every failure is surfaced to the caller
//! at the call that detects it; nothing here is retried or downgraded.

use crate::exit_codes;
use crate::registry::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for prompty operations.
///
/// Each variant maps to a process exit code so the CLI can report failures
/// consistently.
#[derive(Error, Debug)]
pub enum PromptyError {
    /// A structural problem in a definition block (model, template, metadata, ...).
    #[error("error in {block} settings: {message}")]
    Definition { block: String, message: String },

    /// A declared type disagrees with an inferred or supplied one.
    #[error("type mismatch for property '{name}': declared type ({expected}) != actual type ({actual})")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// A value whose runtime shape has no schema type (e.g. null).
    #[error("cannot infer a type for property '{name}' from a {actual} value")]
    InvalidType { name: String, actual: String },

    /// A required input was neither supplied nor defaulted.
    #[error("missing input property '{0}'")]
    MissingInput(String),

    /// A required `${env:...}` placeholder could not be resolved.
    #[error("variable '{0}' not found in environment")]
    MissingVariable(String),

    /// Malformed `${...}` syntax or an unknown scope.
    #[error("invalid attribute reference ({0})")]
    InvalidReference(String),

    /// A referenced file or base definition does not exist.
    #[error("file '{}' not found", .0.display())]
    NotFound(PathBuf),

    /// A base chain refers back to a definition already being loaded.
    #[error("base chain cycles back to '{}'", .0.display())]
    CyclicBase(PathBuf),

    /// No plugin is registered for a stage selector.
    #[error("no {stage} registered for '{selector}'")]
    UnregisteredPlugin { stage: Stage, selector: String },

    /// A plugin failed while running its stage.
    #[error("{stage} '{selector}' failed: {source}")]
    Stage {
        stage: Stage,
        selector: String,
        #[source]
        source: anyhow::Error,
    },

    /// Reading a file failed.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be parsed as a structured document.
    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl PromptyError {
    /// Shorthand for a [`PromptyError::Definition`] on the named block.
    pub fn definition(block: impl Into<String>, message: impl ToString) -> Self {
        PromptyError::Definition {
            block: block.into(),
            message: message.to_string(),
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PromptyError::TypeMismatch { .. }
            | PromptyError::InvalidType { .. }
            | PromptyError::MissingInput(_) => exit_codes::VALIDATION_FAILURE,
            PromptyError::UnregisteredPlugin { .. } | PromptyError::Stage { .. } => {
                exit_codes::PLUGIN_FAILURE
            }
            PromptyError::Definition { .. }
            | PromptyError::MissingVariable(_)
            | PromptyError::InvalidReference(_)
            | PromptyError::NotFound(_)
            | PromptyError::CyclicBase(_)
            | PromptyError::Io { .. }
            | PromptyError::Parse { .. } => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for prompty operations.
pub type Result<T> = std::result::Result<T, PromptyError>;
