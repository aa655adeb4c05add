//! Mock engine extensions tool for integration testing
//!
//! Understands `aaa login-user` and `aaa search` well enough to exercise the
//! wizard. Each run appends a JSON line describing the call to the file
//! named by `MOCK_TOOL_RECORD`, if set.
//!
//! Login succeeds for `MOCK_TOOL_USER`/`MOCK_TOOL_PASSWORD` (default
//! `admin`/`secret`), with the password read from the variable named in
//! `--password=env:<var>`. Search succeeds for any non-empty term.

use serde_json::json;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_options(&args);
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();

    let password = options
        .get("password")
        .and_then(|p| p.strip_prefix("env:"))
        .and_then(|var| std::env::var(var).ok());

    let layout = options
        .get("extensions-dir")
        .and_then(|dir| Path::new(dir).parent())
        .map(|root| list_files(root, root))
        .unwrap_or_default();

    let code = match positional.as_slice() {
        ["aaa", "login-user"] => login(&options, password.as_deref()),
        ["aaa", "search"] => search(&options),
        _ => {
            eprintln!("SEVERE Unknown command: {}", positional.join(" "));
            2
        }
    };

    if let Ok(path) = std::env::var("MOCK_TOOL_RECORD") {
        let record = json!({
            "args": args,
            "password": password,
            "layout": layout,
            "exit_code": code,
        });
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", record);
        }
    }

    std::process::exit(code);
}

fn parse_options(args: &[String]) -> BTreeMap<String, String> {
    args.iter()
        .filter_map(|a| a.strip_prefix("--"))
        .filter_map(|a| a.split_once('='))
        .filter(|(k, _)| *k != "authz-flag")
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn login(options: &BTreeMap<String, String>, password: Option<&str>) -> i32 {
    let expected_user = std::env::var("MOCK_TOOL_USER").unwrap_or_else(|_| "admin".to_string());
    let expected_password =
        std::env::var("MOCK_TOOL_PASSWORD").unwrap_or_else(|_| "secret".to_string());
    let user = options.get("user-name").map(String::as_str).unwrap_or("");

    eprintln!("INFO    API: -->Authn.InvokeCommands.AUTHENTICATE_CREDENTIALS profile='{}' user='{}'",
        options.get("profile").map(String::as_str).unwrap_or(""),
        user
    );

    if user == expected_user && password == Some(expected_password.as_str()) {
        eprintln!("INFO    --- Begin PrincipalRecord ---");
        eprintln!("INFO    PrincipalRecord.NAME: {}", user);
        eprintln!("INFO    --- End PrincipalRecord ---");
        0
    } else {
        eprintln!("SEVERE  Authn.Result code is: CREDENTIALS_INVALID");
        1
    }
}

fn search(options: &BTreeMap<String, String>) -> i32 {
    let entity = options.get("entity").map(String::as_str).unwrap_or("");
    let term = options.get("entity-name").map(String::as_str).unwrap_or("");

    if term.is_empty() {
        eprintln!("SEVERE  Search term is empty");
        return 1;
    }

    let record = match entity {
        "Principal" => "PrincipalRecord",
        "Group" => "GroupRecord",
        other => {
            eprintln!("SEVERE  Unknown entity '{}'", other);
            return 1;
        }
    };
    eprintln!("INFO    --- Begin {} ---", record);
    eprintln!("INFO    {}.NAME: {}", record, term.trim_end_matches('*'));
    eprintln!("INFO    --- End {} ---", record);
    0
}

/// Files under `dir`, relative to `root`, with their sizes
fn list_files(root: &Path, dir: &Path) -> BTreeMap<String, u64> {
    let mut files = BTreeMap::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(list_files(root, &path));
        } else if let (Ok(rel), Ok(meta)) = (path.strip_prefix(root), entry.metadata()) {
            files.insert(rel.display().to_string(), meta.len());
        }
    }
    files
}
