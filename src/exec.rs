//! Child process execution
//!
//! The wizard only needs one thing from a process: run it to completion and
//! hand back the exit code with the captured output. [`Executor`] is that
//! seam; [`ProcessExecutor`] is the real implementation.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::common::{Error, Result};

/// A value that must not show up in logs or debug output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**FILTERED**)")
    }
}

/// A fully described process run
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Added to the inherited environment
    pub env: Vec<(String, Secret)>,
    /// Turn a non-zero exit into [`Error::ToolFailed`]
    pub raise_on_error: bool,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            raise_on_error: true,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: Secret) -> Self {
        self.env.push((key.into(), value));
        self
    }

    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    /// Program and arguments as a single line, for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    /// Exit code; -1 when terminated by a signal
    pub code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl Execution {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Subprocess interface used by the wizard
pub trait Executor {
    /// Run `invocation` to completion
    ///
    /// A non-zero exit is only an error when `raise_on_error` is set. Failing
    /// to start the process always is.
    fn execute(&mut self, invocation: &Invocation) -> Result<Execution>;
}

/// Runs invocations as real child processes, blocking until they exit
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<Execution> {
        tracing::debug!("Executing: {}", invocation.command_line());
        if !invocation.env.is_empty() {
            let keys: Vec<&str> = invocation.env.iter().map(|(k, _)| k.as_str()).collect();
            tracing::debug!("Environment additions: {}", keys.join(", "));
        }

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.expose())))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::ToolSpawn {
                path: invocation.program.clone(),
                source: e,
            })?;

        let execution = Execution {
            code: output.status.code().unwrap_or(-1),
            stdout: lines(&output.stdout),
            stderr: lines(&output.stderr),
        };

        tracing::debug!("Exit code: {}", execution.code);
        for line in &execution.stdout {
            tracing::debug!("stdout: {}", line);
        }
        for line in &execution.stderr {
            tracing::debug!("stderr: {}", line);
        }

        if invocation.raise_on_error && !execution.success() {
            return Err(Error::ToolFailed {
                path: invocation.program.clone(),
                code: execution.code,
            });
        }

        Ok(execution)
    }
}

fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}
