//! Command lines of the engine extensions tool
//!
//! Only the `aaa login-user` and `aaa search` actions are used. The password
//! never appears in arguments: the tool is told to read it from the `pass`
//! environment variable.

use std::path::{Path, PathBuf};

use crate::exec::{Invocation, Secret};
use crate::layout::EXTENSIONS_DIR;

/// Environment variable carrying the login password
pub const PASSWORD_ENV: &str = "pass";

/// Entity kinds the search action understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Principal,
    Group,
}

impl Entity {
    pub const ALL: [Entity; 2] = [Entity::Principal, Entity::Group];

    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Principal => "Principal",
            Entity::Group => "Group",
        }
    }

    /// Parse an entity name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
    }
}

/// Parameters of one search run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub extension_name: String,
    pub entity: Entity,
    /// Search term; a trailing `*` is a wildcard
    pub term: String,
    pub resolve_groups: bool,
}

/// Name of the authz extension for a profile
///
/// With VM single sign-on the profile's own name is used; otherwise the authz
/// extension carries an `-authz` suffix.
pub fn extension_name(profile: &str, use_vm_sso: bool) -> String {
    if use_vm_sso {
        profile.to_string()
    } else {
        format!("{profile}-authz")
    }
}

/// The extensions tool binary
#[derive(Debug, Clone)]
pub struct ExtensionsTool {
    path: PathBuf,
}

impl ExtensionsTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `aaa login-user` against the layout at `layout_dir`
    pub fn login_user(
        &self,
        layout_dir: &Path,
        profile: &str,
        user: &str,
        password: Secret,
    ) -> Invocation {
        self.aaa(layout_dir, "login-user")
            .arg(format!("--profile={profile}"))
            .arg(format!("--user-name={user}"))
            .arg(format!("--password=env:{PASSWORD_ENV}"))
            .env(PASSWORD_ENV, password)
    }

    /// `aaa search` against the layout at `layout_dir`
    pub fn search(&self, layout_dir: &Path, request: &SearchRequest) -> Invocation {
        let invocation = self
            .aaa(layout_dir, "search")
            .arg(format!("--extension-name={}", request.extension_name))
            .arg(format!("--entity={}", request.entity.as_str()))
            .arg(format!("--entity-name={}", request.term));

        if request.resolve_groups {
            invocation.args([
                "--authz-flag=resolve-groups",
                "--authz-flag=resolve-groups-recursive",
            ])
        } else {
            invocation
        }
    }

    fn aaa(&self, layout_dir: &Path, action: &str) -> Invocation {
        Invocation::new(&self.path)
            .arg(format!(
                "--extensions-dir={}",
                layout_dir.join(EXTENSIONS_DIR).display()
            ))
            .args(["aaa", action])
            .raise_on_error(false)
    }
}
