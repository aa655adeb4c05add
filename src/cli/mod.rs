//! CLI command handling
//!
//! Wires the configuration, dialog and executor together and formats output.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Error, LogFilter, Result};
use crate::dialog::{AnswerFile, Answered, TerminalDialog};
use crate::environment::Environment;
use crate::exec::{ProcessExecutor, Secret};
use crate::layout::ArtifactKind;
use crate::tool::{extension_name, ExtensionsTool};
use crate::wizard::{self, Credentials, Profile, Wizard};

/// Dispatch a CLI command
pub fn dispatch(command: Commands, config: Config, log_filter: LogFilter) -> Result<()> {
    match command {
        Commands::Validate {
            state,
            answers,
            tool,
            user,
            password_env,
        } => {
            let env = Environment::load(&state)?;
            let answers = match answers {
                Some(path) => AnswerFile::load(&path)?,
                None => AnswerFile::default(),
            };
            let password = password_env.map(take_env_secret).transpose()?;

            let tool = ExtensionsTool::new(tool_path(tool, &config));
            tracing::debug!("Using extensions tool {}", tool.path().display());

            let dialog = Answered::new(answers, TerminalDialog::stdio());
            let mut wizard = Wizard::new(
                dialog,
                ProcessExecutor,
                tool,
                Profile::from_environment(&env)?,
            )
            .with_catalog(Catalog::new(config.messages))
            .with_log_filter(log_filter);

            wizard::validate(&env, &mut wizard, Credentials { user, password })
        }

        Commands::Inspect { state, tool, json } => {
            let env = Environment::load(&state)?;
            let report = InspectReport::new(&env, tool_path(tool, &config))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            Ok(())
        }
    }
}

fn tool_path(explicit: Option<PathBuf>, config: &Config) -> PathBuf {
    explicit.unwrap_or_else(|| paths::resolve_tool(config.tool.bin_dir.as_deref(), &config.tool.name))
}

/// Read a password from the environment and drop the variable
///
/// Removing it keeps it out of the extensions tool's inherited environment.
fn take_env_secret(var: String) -> Result<Secret> {
    let value = std::env::var(&var)
        .map_err(|_| Error::Config(format!("Environment variable '{}' is not set", var)))?;
    std::env::remove_var(&var);
    Ok(Secret::new(value))
}

#[derive(Debug, Serialize)]
struct InspectReport {
    enabled: bool,
    profile: String,
    use_vm_sso: bool,
    extension_name: String,
    tool: PathBuf,
    artifacts: Vec<ArtifactPlan>,
}

#[derive(Debug, Serialize)]
struct ArtifactPlan {
    kind: ArtifactKind,
    path: PathBuf,
    bytes: usize,
    binary: bool,
}

impl InspectReport {
    fn new(env: &Environment, tool: PathBuf) -> Result<Self> {
        let profile = Profile::from_environment(env)?;
        let artifacts = env
            .artifacts()?
            .into_iter()
            .map(|a| ArtifactPlan {
                kind: a.kind,
                bytes: a.content.to_bytes().len(),
                binary: a.kind.is_binary(),
                path: a.relative_path,
            })
            .collect();

        Ok(Self {
            enabled: env.tool_enabled()?,
            extension_name: extension_name(&profile.name, profile.use_vm_sso),
            profile: profile.name,
            use_vm_sso: profile.use_vm_sso,
            tool,
            artifacts,
        })
    }
}

fn print_report(report: &InspectReport) {
    println!("{} {}", "Profile:".bold(), report.profile);
    println!("{} {}", "Authz extension:".bold(), report.extension_name);
    println!("{} {}", "Extensions tool:".bold(), report.tool.display());
    if !report.enabled {
        println!("{}", "Test drive is disabled (tool.enable = false)".yellow());
    }
    println!();
    println!("{}", "Layout:".bold());
    for artifact in &report.artifacts {
        println!(
            "  {:10} {:50} {:>8} bytes{}",
            format!("{:?}", artifact.kind).to_lowercase(),
            artifact.path.display().to_string(),
            artifact.bytes,
            if artifact.binary { " (binary)" } else { "" }
        );
    }
}
