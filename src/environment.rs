//! Setup state handed over by the installer
//!
//! The installer computes the LDAP configuration before the validation step
//! and leaves it in a TOML state file. It is read here as a key-value store
//! addressed by dotted keys such as `aaa.profile_name`.

use std::path::{Path, PathBuf};

use crate::common::{Error, Result};
use crate::layout::{Artifact, ArtifactKind, Content};

/// Keys understood by the wizard
pub mod keys {
    pub const AAA_PROFILE_NAME: &str = "aaa.profile_name";
    pub const AAA_USE_VM_SSO: &str = "aaa.use_vm_sso";
    pub const TOOL_ENABLE: &str = "tool.enable";
    pub const CONFIG_AUTHN: &str = "config.authn";
    pub const CONFIG_AUTHZ: &str = "config.authz";
    pub const CONFIG_PROFILE: &str = "config.profile";
    pub const CONFIG_JKS: &str = "config.jks";
}

/// Dotted-key view over the setup state
#[derive(Debug, Clone)]
pub struct Environment {
    table: toml::Table,
    /// Directory that relative `{ path = ... }` content references resolve against
    base_dir: PathBuf,
}

impl Environment {
    /// Load the state file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::parse(&content, base_dir)
    }

    /// Parse state from TOML text
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let table: toml::Table = content
            .parse()
            .map_err(|e: toml::de::Error| Error::ConfigParse(e.to_string()))?;
        let mut env = Self {
            table,
            base_dir: base_dir.into(),
        };
        env.set_default(keys::TOOL_ENABLE, toml::Value::Boolean(true));
        Ok(env)
    }

    /// Look up a dotted key
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let mut value = self.table.get(parts.next()?)?;
        for part in parts {
            value = value.as_table()?.get(part)?;
        }
        Some(value)
    }

    /// Set `key` unless it already has a value
    ///
    /// Missing intermediate tables are created. A non-table value in the way
    /// is left untouched.
    pub fn set_default(&mut self, key: &str, default: toml::Value) {
        let mut parts: Vec<&str> = key.split('.').collect();
        let Some(last) = parts.pop() else {
            return;
        };

        let mut table = &mut self.table;
        for part in parts {
            let entry = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            match entry.as_table_mut() {
                Some(t) => table = t,
                None => return,
            }
        }
        table.entry(last.to_string()).or_insert(default);
    }

    /// Required string value
    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(toml::Value::String(s)) => Ok(s),
            Some(_) => Err(Error::invalid_setting(key, "expected a string")),
            None => Err(Error::MissingSetting(key.to_string())),
        }
    }

    /// Boolean value, `default` when absent
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            Some(toml::Value::Boolean(b)) => Ok(*b),
            Some(_) => Err(Error::invalid_setting(key, "expected true or false")),
            None => Ok(default),
        }
    }

    pub fn profile_name(&self) -> Result<&str> {
        let name = self.get_str(keys::AAA_PROFILE_NAME)?;
        if name.is_empty() {
            return Err(Error::invalid_setting(
                keys::AAA_PROFILE_NAME,
                "profile name is empty",
            ));
        }
        Ok(name)
    }

    pub fn use_vm_sso(&self) -> Result<bool> {
        self.get_bool_or(keys::AAA_USE_VM_SSO, false)
    }

    pub fn tool_enabled(&self) -> Result<bool> {
        self.get_bool_or(keys::TOOL_ENABLE, true)
    }

    /// The four artifacts making up the tool layout, in writing order
    pub fn artifacts(&self) -> Result<Vec<Artifact>> {
        ArtifactKind::ALL
            .iter()
            .map(|&kind| self.artifact(kind))
            .collect()
    }

    fn artifact(&self, kind: ArtifactKind) -> Result<Artifact> {
        let key = artifact_key(kind);
        let file_name_key = format!("{key}.file_name");
        let relative_path = PathBuf::from(self.get_str(&file_name_key)?);
        let content = self.content(&format!("{key}.content"))?;
        Ok(Artifact::new(kind, relative_path, content))
    }

    /// Artifact content stored under `key`
    ///
    /// A string is taken verbatim, an array of strings as lines, and a table
    /// `{ path = "..." }` as the raw bytes of that file.
    fn content(&self, key: &str) -> Result<Content> {
        let value = match self.get(key) {
            Some(value) => value,
            None => return Ok(Content::Empty),
        };

        match value {
            toml::Value::String(s) => Ok(Content::Text(s.clone())),
            toml::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| Error::invalid_setting(key, "lines must be strings"))
                })
                .collect::<Result<Vec<_>>>()
                .map(Content::Lines),
            toml::Value::Table(t) => {
                let path = t
                    .get("path")
                    .and_then(toml::Value::as_str)
                    .ok_or_else(|| Error::invalid_setting(key, "table content needs a 'path'"))?;
                let path = self.resolve(Path::new(path));
                let bytes = std::fs::read(&path).map_err(|e| Error::FileRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?;
                Ok(Content::Bytes(bytes))
            }
            _ => Err(Error::invalid_setting(
                key,
                "expected a string, an array of lines or { path = ... }",
            )),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

fn artifact_key(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Authn => keys::CONFIG_AUTHN,
        ArtifactKind::Authz => keys::CONFIG_AUTHZ,
        ArtifactKind::Profile => keys::CONFIG_PROFILE,
        ArtifactKind::Keystore => keys::CONFIG_JKS,
    }
}
