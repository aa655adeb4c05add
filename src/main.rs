//! LDAP AAA configuration test drive
//!
//! Runs the Login and Search sequences of the engine extensions tool against
//! a generated configuration before the installer applies it.

use std::path::PathBuf;

use aaa_ldap_tool::common::{config::Config, logging};
use aaa_ldap_tool::{cli, commands, LogFilter};
use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "aaa-ldap-tool", about = "Test drive an LDAP AAA configuration")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let log_filter = LogFilter::new();
    logging::init_cli(&log_filter, config.logging.file.as_deref());

    if let Err(e) = cli::dispatch(cli.command, config, log_filter) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
