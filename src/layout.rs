//! Temporary extensions layout
//!
//! The extensions tool expects a directory with `extensions.d/` holding the
//! extension property files and `aaa/` holding the profile configuration and
//! the keystore. [`ToolLayout`] builds that tree under a fresh temporary
//! directory and removes it again when closed or dropped.

use std::borrow::Cow;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;

use crate::common::{Error, Result};

/// Subdirectory holding extension definitions
pub const EXTENSIONS_DIR: &str = "extensions.d";

/// Subdirectory holding profile configuration and keystore
pub const AAA_DIR: &str = "aaa";

/// The four generated configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Authn,
    Authz,
    Profile,
    Keystore,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Authn,
        ArtifactKind::Authz,
        ArtifactKind::Profile,
        ArtifactKind::Keystore,
    ];

    /// The keystore is a JKS file and is written byte for byte
    pub fn is_binary(self) -> bool {
        matches!(self, ArtifactKind::Keystore)
    }
}

/// Artifact payload as found in the setup state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Nothing computed; an empty file is written
    Empty,
    /// Written verbatim
    Text(String),
    /// Joined with newlines, with a trailing newline
    Lines(Vec<String>),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Content {
    /// Bytes that end up on disk
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Content::Empty => Cow::Borrowed(&[]),
            Content::Text(text) => Cow::Borrowed(text.as_bytes()),
            Content::Lines(lines) => {
                let mut joined = lines.join("\n");
                joined.push('\n');
                Cow::Owned(joined.into_bytes())
            }
            Content::Bytes(bytes) => Cow::Borrowed(bytes),
        }
    }

    /// Content as text, `None` if it holds bytes that are not UTF-8
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self.to_bytes() {
            Cow::Borrowed(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Cow::Owned(bytes) => String::from_utf8(bytes).ok().map(Cow::Owned),
        }
    }
}

/// One file of the layout
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Path relative to the layout root
    pub relative_path: PathBuf,
    pub content: Content,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, relative_path: impl Into<PathBuf>, content: Content) -> Self {
        Self {
            kind,
            relative_path: relative_path.into(),
            content,
        }
    }
}

/// A populated temporary layout
///
/// The directory is removed by [`ToolLayout::close`], or best-effort on drop.
#[derive(Debug)]
pub struct ToolLayout {
    dir: TempDir,
}

impl ToolLayout {
    /// Build the layout under `parent`
    ///
    /// On failure the partially written directory is removed before the
    /// error is returned.
    pub fn create_in(parent: &Path, artifacts: &[Artifact]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("aaa-ldap-tool-")
            .tempdir_in(parent)
            .map_err(|e| Error::layout(parent, e))?;

        // Any early return below drops `dir`, which removes it
        for sub in [EXTENSIONS_DIR, AAA_DIR] {
            let path = dir.path().join(sub);
            fs::create_dir(&path).map_err(|e| Error::layout(&path, e))?;
        }

        for artifact in artifacts {
            write_artifact(dir.path(), artifact)?;
        }

        tracing::debug!("Tool layout ready at {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Root of the layout
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the layout, reporting failures
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        tracing::debug!("Removing tool layout {}", path.display());
        self.dir.close().map_err(|e| Error::layout(path, e))
    }
}

fn write_artifact(root: &Path, artifact: &Artifact) -> Result<()> {
    let relative = checked_relative(&artifact.relative_path)?;
    let path = root.join(relative);
    tracing::debug!("Writing: {}", path.display());

    if artifact.kind.is_binary() {
        fs::write(&path, artifact.content.to_bytes()).map_err(|e| Error::layout(&path, e))
    } else {
        let text = artifact.content.to_text().ok_or_else(|| {
            Error::invalid_setting(
                &artifact.relative_path.display().to_string(),
                "text artifact is not valid UTF-8",
            )
        })?;
        fs::write(&path, text.as_bytes()).map_err(|e| Error::layout(&path, e))
    }
}

/// Reject paths that would land outside the layout root
fn checked_relative(path: &Path) -> Result<&Path> {
    let mut has_name = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_name = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafeArtifactPath(path.to_path_buf()));
            }
        }
    }
    if !has_name {
        return Err(Error::UnsafeArtifactPath(path.to_path_buf()));
    }
    Ok(path)
}
