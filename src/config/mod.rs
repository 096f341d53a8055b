//! Global configuration for prompty.
//!
//! Connection profiles live in a `prompty.json` file next to (or above) the
//! definitions that use them:
//!
//! ```json
//! {
//!   "default": {
//!     "type": "azure_openai",
//!     "azure_endpoint": "${env:AZURE_OPENAI_ENDPOINT}"
//!   },
//!   "local": {
//!     "type": "openai",
//!     "base_url": "http://localhost:11434/v1"
//!   }
//! }
//! ```
//!
//! The selected profile becomes the bottom layer of a definition's
//! `model.configuration`: anything the definition sets wins.

mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use model::{CONFIG_FILE_NAME, DEFAULT_CONNECTION, GlobalConfig};
pub use operations::{load_global_config, load_global_config_async};
