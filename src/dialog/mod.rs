//! Operator dialog
//!
//! The wizard talks to the operator through the [`Dialog`] trait: it shows
//! notes and asks [`Query`]s. [`TerminalDialog`] does this on the console,
//! [`Answered`] answers from an answer file first.

mod answers;
mod terminal;

pub use answers::{AnswerFile, Answered};
pub use terminal::TerminalDialog;

use crate::common::Result;

/// Prompt/notify interface used by the wizard
pub trait Dialog {
    /// Show informational text, one or more lines
    fn note(&mut self, text: &str);

    /// Ask a question and return an accepted answer
    ///
    /// For queries with valid values the canonical spelling of the matching
    /// value is returned, whatever the case of the input.
    fn query_string(&mut self, query: &Query<'_>) -> Result<String>;
}

/// A single question
#[derive(Debug, Clone)]
pub struct Query<'a> {
    /// Stable name, used as the answer file key
    pub name: &'a str,
    /// Prompt text; `@VALUES@` and `@DEFAULT@` are substituted
    pub note: String,
    /// Do not echo the input
    pub hidden: bool,
    pub case_sensitive: bool,
    /// Accepted answers; empty means free text
    pub valid_values: Vec<String>,
    /// Used when the answer is empty
    pub default: Option<String>,
}

impl<'a> Query<'a> {
    pub fn new(name: &'a str, note: impl Into<String>) -> Self {
        Self {
            name,
            note: note.into(),
            hidden: false,
            case_sensitive: true,
            valid_values: Vec::new(),
            default: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Restrict answers to `values`, matched case-insensitively
    pub fn choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self.case_sensitive = false;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Prompt text with placeholders filled in
    pub fn prompt(&self) -> String {
        self.note
            .replace("@VALUES@", &self.valid_values.join(", "))
            .replace("@DEFAULT@", self.default.as_deref().unwrap_or(""))
    }

    /// Validate raw input
    ///
    /// Returns the accepted answer, or `None` if the input must be asked
    /// again. Hidden input is taken as typed; visible input is trimmed.
    pub fn accept(&self, raw: &str) -> Option<String> {
        let value = if self.hidden {
            raw.trim_end_matches(['\r', '\n'])
        } else {
            raw.trim()
        };

        let value = match (&self.default, value.is_empty()) {
            (Some(default), true) => default.as_str(),
            _ => value,
        };

        if self.valid_values.is_empty() {
            return Some(value.to_string());
        }

        self.valid_values
            .iter()
            .find(|valid| {
                if self.case_sensitive {
                    valid.as_str() == value
                } else {
                    valid.to_lowercase() == value.to_lowercase()
                }
            })
            .cloned()
    }
}
