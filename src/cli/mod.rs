//! CLI argument parsing for prompty.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Prompty: inspect and validate prompt asset definitions.
///
/// A definition is a `.prompty` file: YAML frontmatter describing the model,
/// inputs and template, followed by the prompt body. Loading resolves
/// `${env:...}` and `${file:...}` placeholders, the nearest `prompty.json`
/// connection profile, and any `base` definition.
#[derive(Parser, Debug)]
#[command(name = "prompty")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for prompty.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a fully resolved definition.
    ///
    /// Prints metadata, model binding, inputs and the content body after
    /// placeholders, global configuration and base inheritance are applied.
    Show(ShowArgs),

    /// Print the sample inputs of a definition as JSON.
    ///
    /// Each declared input contributes its `sample`, or its `default` if it
    /// has no sample.
    Sample(SampleArgs),

    /// Validate inputs against a definition.
    ///
    /// Prints the validated input values as JSON, or fails with exit code 2
    /// when an input is missing or has the wrong type.
    Check(CheckArgs),
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Path to the `.prompty` file.
    pub file: PathBuf,

    /// `prompty.json` connection profile to apply.
    #[arg(short, long, default_value = "default")]
    pub connection: String,

    /// Print the definition as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `sample` command.
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Path to the `.prompty` file.
    pub file: PathBuf,

    /// `prompty.json` connection profile to apply.
    #[arg(short, long, default_value = "default")]
    pub connection: String,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the `.prompty` file.
    pub file: PathBuf,

    /// `prompty.json` connection profile to apply.
    #[arg(short, long, default_value = "default")]
    pub connection: String,

    /// Inputs as a JSON object (e.g. '{"question": "hi"}').
    #[arg(short, long, value_parser = parse_json_object, default_value = "{}")]
    pub inputs: Map<String, Value>,

    /// Fill missing inputs from the definition's sample values.
    #[arg(long)]
    pub merge_sample: bool,
}

fn parse_json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
