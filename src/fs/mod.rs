//! Filesystem utilities for prompty.
//!
//! Every file the engine touches (definitions, `${file:...}` references,
//! `prompty.json`) is read through here so that a missing file is always a
//! [`PromptyError::NotFound`] and every other I/O failure carries its path.
//!
//! [`PromptyError::NotFound`]: crate::error::PromptyError::NotFound

mod read;

pub use read::{parse_structured, read_file, read_file_async};
