//! Prompty: declarative prompt asset definitions and a pluggable invoker pipeline.
//!
//! A `.prompty` file is YAML frontmatter (metadata, model binding, input
//! schema, template settings) plus a content body. Loading one resolves
//! `${env:...}` / `${file:...}` placeholders, layers it over the nearest
//! `prompty.json` connection profile and over its `base` definition, and
//! yields a [`Prompty`].
//!
//! Running one goes through four pluggable stages looked up in a
//! [`Registry`]: render and parse (`prepare`), then execute and process
//! (`run`). Every operation comes in a blocking and an async form.
//!
//! ```no_run
//! use prompty::pipeline::{ExecuteOptions, execute};
//! use serde_json::json;
//!
//! let options = ExecuteOptions {
//!     inputs: json!({"question": "What is Rust?"}).as_object().cloned().unwrap_or_default(),
//!     ..ExecuteOptions::default()
//! };
//! let response = execute(std::path::PathBuf::from("prompts/basic.prompty"), &options)?;
//! # Ok::<(), prompty::PromptyError>(())
//! ```

pub mod config;
pub mod definition;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod registry;
pub mod stream;
pub mod trace;

#[cfg(test)]
mod test_support;

pub use definition::{Content, Prompty, param_hoisting};
pub use error::{PromptyError, Result};
pub use loader::{headless, headless_async, load, load_async};
pub use pipeline::{Invoker, execute, execute_async, prepare, prepare_async, run, run_async};
pub use registry::{Registry, Response, Stage};
pub use stream::{AsyncPromptyStream, PromptyStream};
