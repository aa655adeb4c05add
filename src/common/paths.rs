//! Configuration and tool locations
//!
//! Configuration follows platform conventions via the directories crate.
//! The extensions tool lives in the engine's bin directory, which is
//! `/usr/bin` on a packaged installation.

use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "aaa-ldap-tool";

/// File name of the engine extensions tool
pub const EXTENSIONS_TOOL: &str = "ovirt-engine-extensions-tool";

/// Bin directory of a packaged engine installation
pub const DEFAULT_BIN_DIR: &str = "/usr/bin";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/aaa-ldap-tool/`
/// - macOS: `~/Library/Application Support/aaa-ldap-tool/`
/// - Windows: `%APPDATA%\aaa-ldap-tool\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve the extensions tool executable
///
/// Order: explicit bin directory, `PATH` lookup, then the packaged default.
/// The returned path is not checked for existence when it comes from an
/// explicit bin directory; a missing binary surfaces as a spawn error.
pub fn resolve_tool(bin_dir: Option<&Path>, name: &str) -> PathBuf {
    if let Some(dir) = bin_dir {
        return dir.join(name);
    }

    if let Ok(path) = which::which(name) {
        return path;
    }

    Path::new(DEFAULT_BIN_DIR).join(name)
}
