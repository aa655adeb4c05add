//! CLI command definitions
//!
//! Defines the clap commands for the LDAP tool wizard.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Test drive a generated LDAP configuration before applying it
    Validate {
        /// Setup state file holding the generated configuration
        #[arg(long)]
        state: PathBuf,

        /// Answer file with pre-set answers for prompts
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Path to the extensions tool (default: from config, PATH, /usr/bin)
        #[arg(long)]
        tool: Option<PathBuf>,

        /// User name for the initial login sequence
        #[arg(long)]
        user: Option<String>,

        /// Environment variable holding the password for the initial login
        #[arg(long, value_name = "VAR")]
        password_env: Option<String>,
    },

    /// Show what a test drive would lay out, without running anything
    Inspect {
        /// Setup state file holding the generated configuration
        #[arg(long)]
        state: PathBuf,

        /// Path to the extensions tool (default: from config, PATH, /usr/bin)
        #[arg(long)]
        tool: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
