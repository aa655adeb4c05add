//! Logging and tracing configuration
//!
//! Every log sink goes through a redacting writer. Secrets registered with
//! the [`LogFilter`] (passwords typed into the wizard) are replaced before
//! anything reaches stderr or the log file.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{layer, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Replacement text for redacted secrets
pub const FILTERED: &str = "**FILTERED**";

/// Shared list of secrets that must never be logged
///
/// Cloning yields another handle to the same list, so a secret added by the
/// wizard is picked up by writers created earlier.
#[derive(Clone, Default)]
pub struct LogFilter {
    secrets: Arc<RwLock<Vec<String>>>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret. Empty strings are ignored.
    pub fn add(&self, secret: &str) {
        if secret.is_empty() {
            return;
        }
        let mut secrets = self.secrets.write().unwrap_or_else(|e| e.into_inner());
        if secrets.iter().any(|s| s == secret) {
            return;
        }
        secrets.push(secret.to_string());
        // Longest first so a secret containing another is replaced whole
        secrets.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    /// Number of registered secrets
    pub fn len(&self) -> usize {
        self.secrets.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every registered secret in `text`
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let secrets = self.secrets.read().unwrap_or_else(|e| e.into_inner());
        let mut out = Cow::Borrowed(text);
        for secret in secrets.iter() {
            if out.contains(secret.as_str()) {
                out = Cow::Owned(out.replace(secret.as_str(), FILTERED));
            }
        }
        out
    }
}

impl fmt::Debug for LogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFilter")
            .field("secrets", &self.len())
            .finish()
    }
}

/// [`MakeWriter`] wrapper that redacts through a [`LogFilter`]
pub struct Redacting<M> {
    inner: M,
    filter: LogFilter,
}

impl<M> Redacting<M> {
    pub fn new(inner: M, filter: LogFilter) -> Self {
        Self { inner, filter }
    }
}

impl<'a, M> MakeWriter<'a> for Redacting<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new(self.inner.make_writer(), self.filter.clone())
    }
}

/// Writer that redacts each chunk before passing it on
///
/// The fmt layer formats a whole event before writing, so a secret is never
/// split across two `write` calls.
pub struct RedactingWriter<W> {
    inner: W,
    filter: LogFilter,
}

impl<W> RedactingWriter<W> {
    pub fn new(inner: W, filter: LogFilter) -> Self {
        Self { inner, filter }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let redacted = self.filter.redact(&text);
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Initialize tracing for the CLI
///
/// Logs go to stderr, and additionally to `log_file` when configured.
/// Levels are controlled by `RUST_LOG`; default is INFO for this crate and
/// WARN for dependencies.
pub fn init_cli(filter: &LogFilter, log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aaa_ldap_tool=info,warn"));

    let stderr_layer = layer()
        .with_writer(Redacting::new(
            io::stderr as fn() -> io::Stderr,
            filter.clone(),
        ))
        .with_target(false)
        .compact();

    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(appender) => Some(
            layer()
                .with_writer(Redacting::new(appender, filter.clone()))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        ),
        Err(e) => {
            eprintln!("Warning: Could not open log file {}: {}", path.display(), e);
            None
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn open_log_file(path: &Path) -> Result<RollingFileAppender, String> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| "log file path has no file name".to_string())?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|e| e.to_string())
}
