//! Test doubles for the wizard's dialog and executor

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;

use crate::common::{Error, LogFilter, Result};
use crate::dialog::{Dialog, Query};
use crate::exec::{Execution, Executor, Invocation};
use crate::layout::{AAA_DIR, EXTENSIONS_DIR};
use crate::tool::PASSWORD_ENV;

#[derive(Debug, Clone)]
pub struct AskedQuery {
    pub name: String,
    pub default: Option<String>,
    pub hidden: bool,
}

/// Scripted dialog; fails with `PromptClosed` when out of answers
#[derive(Default)]
pub struct FakeDialog {
    answers: HashMap<String, VecDeque<String>>,
    pub notes: Vec<String>,
    pub asked: Vec<String>,
    pub queries: Vec<AskedQuery>,
}

impl FakeDialog {
    pub fn answer(mut self, name: &str, value: &str) -> Self {
        self.answers
            .entry(name.to_string())
            .or_default()
            .push_back(value.to_string());
        self
    }

    pub fn defaults_for(&self, name: &str) -> Vec<Option<&str>> {
        self.queries
            .iter()
            .filter(|q| q.name == name)
            .map(|q| q.default.as_deref())
            .collect()
    }

    pub fn hidden_queries(&self) -> Vec<&str> {
        self.queries
            .iter()
            .filter(|q| q.hidden)
            .map(|q| q.name.as_str())
            .collect()
    }
}

impl Dialog for FakeDialog {
    fn note(&mut self, text: &str) {
        self.notes.push(text.to_string());
    }

    fn query_string(&mut self, query: &Query<'_>) -> Result<String> {
        self.asked.push(query.name.to_string());
        self.queries.push(AskedQuery {
            name: query.name.to_string(),
            default: query.default.clone(),
            hidden: query.hidden,
        });

        let raw = self
            .answers
            .get_mut(query.name)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| Error::PromptClosed(query.name.to_string()))?;
        query
            .accept(&raw)
            .ok_or_else(|| Error::invalid_answer(query.name, &raw, &query.valid_values))
    }
}

/// State of the layout directory when the tool was invoked
#[derive(Debug, Clone)]
pub struct LayoutSeen {
    pub root: PathBuf,
    pub populated: bool,
}

/// Executor returning scripted exit codes
#[derive(Default)]
pub struct FakeExecutor {
    codes: VecDeque<i32>,
    stderr: Vec<String>,
    log_filter: Option<LogFilter>,
    pub invocations: Vec<Invocation>,
    pub layouts_seen: Vec<LayoutSeen>,
    /// Per invocation carrying a password: was it already filtered
    pub secret_registered: Vec<bool>,
}

impl FakeExecutor {
    pub fn exiting(codes: &[i32]) -> Self {
        Self {
            codes: codes.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_stderr(mut self, lines: &[&str]) -> Self {
        self.stderr = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_log_filter(mut self, filter: LogFilter) -> Self {
        self.log_filter = Some(filter);
        self
    }
}

impl Executor for FakeExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<Execution> {
        assert!(!invocation.raise_on_error, "tool must run with raise_on_error off");
        self.invocations.push(invocation.clone());

        let extensions_dir = invocation
            .args
            .iter()
            .find_map(|a| a.strip_prefix("--extensions-dir="))
            .map(PathBuf::from);
        if let Some(dir) = extensions_dir {
            if let Some(root) = dir.parent() {
                let populated = dir.ends_with(EXTENSIONS_DIR)
                    && dir.is_dir()
                    && root.join(AAA_DIR).is_dir()
                    && std::fs::read_dir(&dir).map(|d| d.count()).unwrap_or(0) > 0;
                self.layouts_seen.push(LayoutSeen {
                    root: root.to_path_buf(),
                    populated,
                });
            }
        }

        if let Some(filter) = &self.log_filter {
            for (key, value) in &invocation.env {
                if key == PASSWORD_ENV {
                    self.secret_registered
                        .push(filter.redact(value.expose()) != value.expose());
                }
            }
        }

        let code = self.codes.pop_front().expect("no exit code scripted");
        Ok(Execution {
            code,
            stdout: Vec::new(),
            stderr: self.stderr.clone(),
        })
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every log event at TRACE level captured, unredacted
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buf = SharedBuf::default();
    let sink = buf.clone();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(move || sink.clone())
                .with_ansi(false),
        );
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buf.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
