//! Common utilities shared by the wizard and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};
pub use logging::LogFilter;
