//! LDAP AAA configuration test drive
//!
//! Lays out a freshly generated LDAP AAA extension configuration in a
//! temporary directory and lets an installer operator exercise it with the
//! engine extensions tool before it is applied.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod common;
pub mod dialog;
pub mod environment;
pub mod exec;
pub mod layout;
pub mod tool;
pub mod wizard;

// Re-export commonly used types for tests
pub use common::{Error, LogFilter, Result};
pub use wizard::{Credentials, Profile, Sequence, Wizard};
