//! Console dialog

use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};

use colored::Colorize;

use super::{Dialog, Query};
use crate::common::{Error, Result};

/// Dialog on a line-oriented input and an output stream
///
/// Hidden queries use the terminal's no-echo mode when attached to a TTY and
/// fall back to reading a plain line otherwise.
pub struct TerminalDialog<R, W> {
    input: R,
    output: W,
    tty_password: bool,
}

impl TerminalDialog<StdinLock<'static>, Stdout> {
    /// Dialog on the process' stdin/stdout
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let tty_password = stdin.is_terminal();
        Self {
            input: stdin.lock(),
            output: io::stdout(),
            tty_password,
        }
    }
}

impl<R: BufRead, W: Write> TerminalDialog<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            tty_password: false,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self, query: &Query<'_>, prompt: &str) -> Result<String> {
        if query.hidden && self.tty_password {
            return rpassword::prompt_password(prompt).map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => Error::PromptClosed(query.name.to_string()),
                _ => Error::Io(e),
            });
        }

        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(Error::PromptClosed(query.name.to_string()));
        }
        Ok(line)
    }
}

impl<R: BufRead, W: Write> Dialog for TerminalDialog<R, W> {
    fn note(&mut self, text: &str) {
        for line in text.lines() {
            // Console output is best-effort; a closed stdout is not fatal here
            let _ = writeln!(self.output, "[ INFO  ] {}", line);
        }
        let _ = self.output.flush();
    }

    fn query_string(&mut self, query: &Query<'_>) -> Result<String> {
        let prompt = query.prompt();
        loop {
            let raw = self.read_answer(query, &prompt)?;
            if let Some(value) = query.accept(&raw) {
                return Ok(value);
            }
            writeln!(
                self.output,
                "{} Invalid value, please choose one of: {}",
                "[ ERROR ]".red().bold(),
                query.valid_values.join(", ")
            )?;
        }
    }
}
