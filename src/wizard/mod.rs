//! Configuration test drive
//!
//! Builds the temporary tool layout, runs the Login sequence once, then
//! lets the operator pick further sequences until Done or Abort. The layout
//! is removed on every way out.

mod login;
mod search;

#[cfg(test)]
mod fakes;

use std::path::Path;

use crate::catalog::Catalog;
use crate::common::{Error, LogFilter, Result};
use crate::dialog::{Dialog, Query};
use crate::environment::Environment;
use crate::exec::{Execution, Executor, Secret};
use crate::layout::ToolLayout;
use crate::tool::ExtensionsTool;

/// Query names, stable across releases for answer files
pub mod queries {
    pub const SEQUENCE: &str = "OVAAALDAP_LDAP_TOOL_SEQUENCE";
    pub const LOGIN_USER: &str = "OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_USER";
    pub const LOGIN_PASSWORD: &str = "OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_PASSWORD";
    pub const SEARCH_ENTITY: &str = "OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_ENTITY";
    pub const SEARCH_NAME: &str = "OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_NAME";
    pub const SEARCH_RESOLVE_GROUPS: &str = "OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_RESOLVE_GROUPS";
}

/// Menu choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Done,
    Abort,
    Login,
    Search,
}

impl Sequence {
    /// Menu order
    pub const ALL: [Sequence; 4] = [
        Sequence::Done,
        Sequence::Abort,
        Sequence::Login,
        Sequence::Search,
    ];

    /// Untranslated label
    pub fn msgid(self) -> &'static str {
        match self {
            Sequence::Done => "Done",
            Sequence::Abort => "Abort",
            Sequence::Login => "Login",
            Sequence::Search => "Search",
        }
    }

    /// Suggested choice given the outcome of the last sequence
    pub fn suggested(last_succeeded: bool) -> Self {
        if last_succeeded {
            Sequence::Done
        } else {
            Sequence::Abort
        }
    }

    /// Match an answer against the localized labels, ignoring case
    pub fn from_label(catalog: &Catalog, answer: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| catalog.tr(s.msgid()).to_lowercase() == answer.to_lowercase())
    }
}

/// Credentials for the first, automatic Login sequence
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<Secret>,
}

/// Profile settings the sequences need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub use_vm_sso: bool,
}

impl Profile {
    pub fn from_environment(env: &Environment) -> Result<Self> {
        Ok(Self {
            name: env.profile_name()?.to_string(),
            use_vm_sso: env.use_vm_sso()?,
        })
    }
}

/// Interactive session driving the extensions tool
pub struct Wizard<D, E> {
    dialog: D,
    executor: E,
    tool: ExtensionsTool,
    profile: Profile,
    catalog: Catalog,
    log_filter: LogFilter,
}

impl<D: Dialog, E: Executor> Wizard<D, E> {
    pub fn new(dialog: D, executor: E, tool: ExtensionsTool, profile: Profile) -> Self {
        Self {
            dialog,
            executor,
            tool,
            profile,
            catalog: Catalog::default(),
            log_filter: LogFilter::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Filter that entered passwords are registered with
    pub fn with_log_filter(mut self, log_filter: LogFilter) -> Self {
        self.log_filter = log_filter;
        self
    }

    pub fn into_parts(self) -> (D, E) {
        (self.dialog, self.executor)
    }

    /// Run the menu loop against an existing layout
    ///
    /// Returns `Ok` on Done and [`Error::AbortedByUser`] on Abort.
    pub fn run(&mut self, layout_dir: &Path, credentials: Credentials) -> Result<()> {
        let banner = [
            " ",
            self.tr("NOTE:"),
            self.tr("It is highly recommended to test drive the configuration before applying it into engine."),
            self.tr("Login sequence is executed automatically, but it is recommended to also execute Search sequence manually after successful Login sequence."),
            " ",
        ]
        .join("\n");
        self.dialog.note(&banner);

        let mut succeeded =
            self.sequence_login(layout_dir, credentials.user, credentials.password)?;

        loop {
            match self.choose_sequence(succeeded)? {
                Sequence::Done => return Ok(()),
                Sequence::Abort => return Err(Error::AbortedByUser),
                Sequence::Login => succeeded = self.sequence_login(layout_dir, None, None)?,
                Sequence::Search => succeeded = self.sequence_search(layout_dir)?,
            }
        }
    }

    fn choose_sequence(&mut self, last_succeeded: bool) -> Result<Sequence> {
        let labels: Vec<String> = Sequence::ALL
            .iter()
            .map(|s| self.tr(s.msgid()).to_string())
            .collect();
        let suggested = self.tr(Sequence::suggested(last_succeeded).msgid()).to_string();

        let query = Query::new(
            queries::SEQUENCE,
            self.tr("Select test sequence to execute (@VALUES@) [@DEFAULT@]: "),
        )
        .choices(labels.clone())
        .default(suggested);

        let answer = self.dialog.query_string(&query)?;
        Sequence::from_label(&self.catalog, &answer)
            .ok_or_else(|| Error::invalid_answer(queries::SEQUENCE, &answer, &labels))
    }

    fn tr<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.catalog.tr(msgid)
    }

    /// Show the tool's diagnostics and the matching guidance
    fn report(&mut self, header: &str, execution: &Execution, success_guidance: &[&str]) -> bool {
        let mut output = vec![self.tr(header).to_string()];
        output.extend(execution.stderr.iter().cloned());
        self.dialog.note(&output.join("\n"));

        if execution.success() {
            let guidance = success_guidance
                .iter()
                .map(|m| self.tr(m))
                .collect::<Vec<_>>()
                .join("\n");
            self.dialog.note(&guidance);
        } else {
            let guidance = self
                .tr("Please investigate details of the failure (search for lines containing SEVERE log level).")
                .to_string();
            self.dialog.note(&guidance);
        }
        execution.success()
    }
}

/// Run the test drive for the configuration in `env`
///
/// Skipped when `tool.enable` is false. The layout is created under the
/// system temporary directory.
pub fn validate<D: Dialog, E: Executor>(
    env: &Environment,
    wizard: &mut Wizard<D, E>,
    credentials: Credentials,
) -> Result<()> {
    validate_in(&std::env::temp_dir(), env, wizard, credentials)
}

/// [`validate`] with the layout created under `temp_parent`
pub fn validate_in<D: Dialog, E: Executor>(
    temp_parent: &Path,
    env: &Environment,
    wizard: &mut Wizard<D, E>,
    credentials: Credentials,
) -> Result<()> {
    if !env.tool_enabled()? {
        tracing::info!("Configuration test drive disabled, skipping");
        return Ok(());
    }

    let layout = ToolLayout::create_in(temp_parent, &env.artifacts()?)?;
    let outcome = wizard.run(layout.path(), credentials);
    let cleanup = layout.close();

    match (outcome, cleanup) {
        (Err(e), Err(cleanup_err)) => {
            tracing::warn!("{}", cleanup_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), cleanup) => cleanup,
    }
}
