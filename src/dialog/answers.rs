//! Unattended answers
//!
//! An answer file pre-answers queries by name:
//!
//! ```toml
//! [answers]
//! OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_USER = "admin"
//! OVAAALDAP_LDAP_TOOL_SEQUENCE = ["Search", "Done"]
//! ```
//!
//! A string answers every time the query is asked; an array is consumed in
//! order. Once a query has no answer left it is asked interactively.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use serde::Deserialize;

use super::{Dialog, Query};
use crate::common::{Error, Result};

#[derive(Deserialize)]
struct AnswerFileToml {
    #[serde(default)]
    answers: HashMap<String, AnswerValue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Always(String),
    Sequence(Vec<String>),
}

#[derive(Debug, Clone)]
enum Answer {
    Always(String),
    Queue(VecDeque<String>),
}

/// Answers keyed by query name
#[derive(Debug, Clone, Default)]
pub struct AnswerFile {
    answers: HashMap<String, Answer>,
}

impl AnswerFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: AnswerFileToml =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        let answers = file
            .answers
            .into_iter()
            .map(|(name, value)| {
                let answer = match value {
                    AnswerValue::Always(s) => Answer::Always(s),
                    AnswerValue::Sequence(v) => Answer::Queue(v.into()),
                };
                (name, answer)
            })
            .collect();
        Ok(Self { answers })
    }

    /// Set a repeating answer
    #[cfg(test)]
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.answers
            .insert(name.into(), Answer::Always(value.into()));
    }

    /// Next answer for `name`, if any is left
    pub fn next(&mut self, name: &str) -> Option<String> {
        match self.answers.get_mut(name)? {
            Answer::Always(s) => Some(s.clone()),
            Answer::Queue(queue) => queue.pop_front(),
        }
    }
}

/// Dialog that consults an [`AnswerFile`] before asking `inner`
pub struct Answered<D> {
    answers: AnswerFile,
    inner: D,
}

impl<D: Dialog> Answered<D> {
    pub fn new(answers: AnswerFile, inner: D) -> Self {
        Self { answers, inner }
    }
}

impl<D: Dialog> Dialog for Answered<D> {
    fn note(&mut self, text: &str) {
        self.inner.note(text)
    }

    fn query_string(&mut self, query: &Query<'_>) -> Result<String> {
        let Some(raw) = self.answers.next(query.name) else {
            return self.inner.query_string(query);
        };

        let value = query.accept(&raw).ok_or_else(|| {
            Error::invalid_answer(query.name, &raw, &query.valid_values)
        })?;

        if query.hidden {
            tracing::debug!("Answer for {} taken from answer file", query.name);
        } else {
            tracing::debug!("Answer for {} taken from answer file: {}", query.name, value);
        }
        Ok(value)
    }
}
