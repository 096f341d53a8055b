//! Prompt asset definitions.
//!
//! A definition combines structured metadata with a free-form body:
//!
//! ```text
//! ---
//! name: Basic Prompt
//! authors: [sethjuarez]
//! model:
//!   api: chat
//!   configuration:
//!     azure_deployment: gpt-35-turbo
//! inputs:
//!   firstName:
//!     type: string
//!     default: Jane
//!   question: What is the meaning of life?
//! template: jinja2
//! ---
//! system:
//! You are an AI assistant who helps people find information.
//!
//! user:
//! {{question}}
//! ```
//!
//! [`Prompty::load_raw`] turns the (already normalized) attributes into typed
//! blocks, [`Prompty::hoist_base`] layers a definition over its base, and
//! [`param_hoisting`] is the child-wins merge both of them use.

mod hoist;
mod load;
mod model;
mod property;


pub use hoist::param_hoisting;
pub use model::{Content, ModelSettings, Prompty, TemplateSettings, Tool, ToolParameter};
pub use property::{PropertySettings, PropertyType, load_property, type_name};
