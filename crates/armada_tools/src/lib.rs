//! # Armada Development Tools
//!
//! Command-line tools for development:
//! - Catalog and engine config validation
//! - Headless skirmish driver with effect and advisory reporting

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod scenario;
pub mod simulate;
pub mod validate;

pub use error::{ToolError, ToolResult};
