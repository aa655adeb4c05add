//! End-to-end tests for the aaa-ldap-tool binary
//!
//! These tests run the real binary against the mock extensions tool:
//! 1. Write a setup state, an answer file and an empty config
//! 2. Run `aaa-ldap-tool validate` non-interactively
//! 3. Check the tool invocations recorded by the mock, the operator output
//!    and that no temporary layout is left behind

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;

const PASSWORD: &str = "Pa55-w0rd!x";
const KEYSTORE: &[u8] = &[0xfe, 0xed, 0xfe, 0xed, 0x00, 0x00, 0x00, 0x02, 0x0a, 0xff];

/// Test context with paths and cleanup
struct TestContext {
    /// Owns the per-test directory
    _dir: tempfile::TempDir,
    root: PathBuf,
    /// TMPDIR for the binary, where the layout is created
    tmp_dir: PathBuf,
    record: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().to_path_buf();
        let tmp_dir = root.join("tmp");
        fs::create_dir_all(&tmp_dir).expect("Failed to create tmp dir");
        fs::write(root.join("config.toml"), "").expect("Failed to write config");
        fs::write(root.join("keystore.jks"), KEYSTORE).expect("Failed to write keystore");

        Self {
            record: root.join("record.jsonl"),
            _dir: dir,
            root,
            tmp_dir,
        }
    }

    fn write_state(&self, extra: &str) -> PathBuf {
        let path = self.root.join("state.toml");
        let state = format!(
            r#"
[aaa]
profile_name = "myprofile"
use_vm_sso = false

[config.authn]
file_name = "extensions.d/myprofile-authn.properties"
content = ["ovirt.engine.extension.name = myprofile-authn", "ovirt.engine.aaa.authn.profile.name = myprofile"]

[config.authz]
file_name = "extensions.d/myprofile-authz.properties"
content = ["ovirt.engine.extension.name = myprofile-authz"]

[config.profile]
file_name = "aaa/myprofile.properties"
content = ["include = <openldap.properties>", "vars.server = ldap.example.com"]

[config.jks]
file_name = "aaa/myprofile.jks"
content = {{ path = "keystore.jks" }}
{extra}
"#
        );
        fs::write(&path, state).expect("Failed to write state");
        path
    }

    fn write_answers(&self, answers: &str) -> PathBuf {
        let path = self.root.join("answers.toml");
        fs::write(&path, format!("[answers]\n{}", answers)).expect("Failed to write answers");
        path
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_aaa-ldap-tool"));
        cmd.arg("--config")
            .arg(self.root.join("config.toml"))
            .env("TMPDIR", &self.tmp_dir)
            .env("RUST_LOG", "aaa_ldap_tool=debug")
            .env("MOCK_TOOL_RECORD", &self.record)
            .env("MOCK_TOOL_USER", "admin")
            .env("MOCK_TOOL_PASSWORD", PASSWORD)
            .stdin(Stdio::null());
        cmd
    }

    fn validate(&self, state: &Path, answers: Option<&Path>, extra_args: &[&str]) -> Output {
        let mut cmd = self.command();
        cmd.arg("validate")
            .arg("--state")
            .arg(state)
            .arg("--tool")
            .arg(env!("CARGO_BIN_EXE_mock-extensions-tool"));
        if let Some(answers) = answers {
            cmd.arg("--answers").arg(answers);
        }
        cmd.args(extra_args);
        cmd.output().expect("Failed to run aaa-ldap-tool")
    }

    fn records(&self) -> Vec<Value> {
        match fs::read_to_string(&self.record) {
            Ok(content) => content
                .lines()
                .map(|l| serde_json::from_str(l).expect("Invalid record"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn assert_no_layout_left(&self) {
        let leftovers: Vec<_> = fs::read_dir(&self.tmp_dir)
            .expect("Failed to list tmp dir")
            .map(|e| e.unwrap().path())
            .collect();
        assert!(leftovers.is_empty(), "layout left behind: {:?}", leftovers);
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn args(record: &Value) -> Vec<String> {
    record["args"]
        .as_array()
        .expect("args")
        .iter()
        .map(|a| a.as_str().unwrap().to_string())
        .collect()
}

fn extensions_dir(record: &Value) -> PathBuf {
    let arg = args(record)
        .into_iter()
        .find(|a| a.starts_with("--extensions-dir="))
        .expect("--extensions-dir argument");
    PathBuf::from(arg.trim_start_matches("--extensions-dir="))
}

#[test]
fn test_login_then_search_then_done() {
    let ctx = TestContext::new();
    let state = ctx.write_state("");
    let answers = ctx.write_answers(&format!(
        r#"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_USER = "admin"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_PASSWORD = "{PASSWORD}"
OVAAALDAP_LDAP_TOOL_SEQUENCE = ["search", "Done"]
OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_ENTITY = "group"
OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_NAME = "admins*"
OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_RESOLVE_GROUPS = "yes"
"#
    ));

    let output = ctx.validate(&state, Some(&answers), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let records = ctx.records();
    assert_eq!(records.len(), 2);

    // Login
    let login = &records[0];
    let login_args = args(login);
    assert_eq!(
        &login_args[1..],
        &[
            "aaa",
            "login-user",
            "--profile=myprofile",
            "--user-name=admin",
            "--password=env:pass",
        ]
    );
    assert_eq!(login["password"], PASSWORD);
    assert_eq!(login["exit_code"], 0);

    // The layout was complete while the tool ran
    let layout = login["layout"].as_object().expect("layout");
    assert_eq!(layout.len(), 4);
    assert!(layout.contains_key("extensions.d/myprofile-authn.properties"));
    assert!(layout.contains_key("extensions.d/myprofile-authz.properties"));
    assert!(layout.contains_key("aaa/myprofile.properties"));
    assert_eq!(layout["aaa/myprofile.jks"], KEYSTORE.len() as u64);

    // Search
    let search = &records[1];
    let search_args = args(search);
    assert_eq!(
        &search_args[1..],
        &[
            "aaa",
            "search",
            "--extension-name=myprofile-authz",
            "--entity=Group",
            "--entity-name=admins*",
            "--authz-flag=resolve-groups",
            "--authz-flag=resolve-groups-recursive",
        ]
    );
    assert!(search["password"].is_null());

    let out = stdout(&output);
    assert!(out.contains("Login output:"));
    assert!(out.contains("PrincipalRecord.NAME: admin"));
    assert!(out.contains("Search output:"));
    assert!(out.contains("GroupRecord.NAME: admins"));

    assert!(!out.contains(PASSWORD));
    assert!(!stderr(&output).contains(PASSWORD));

    assert!(!extensions_dir(login).exists());
    ctx.assert_no_layout_left();
}

#[test]
fn test_failed_login_then_abort() {
    let ctx = TestContext::new();
    let state = ctx.write_state("");
    let answers = ctx.write_answers(
        r#"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_USER = "admin"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_PASSWORD = "wrong-password"
OVAAALDAP_LDAP_TOOL_SEQUENCE = "Abort"
"#,
    );

    let output = ctx.validate(&state, Some(&answers), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Aborted by user"));

    let records = ctx.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["exit_code"], 1);

    let out = stdout(&output);
    assert!(out.contains("CREDENTIALS_INVALID"));
    assert!(out.contains("search for lines containing SEVERE log level"));
    assert!(!out.contains("wrong-password"));
    assert!(!stderr(&output).contains("wrong-password"));

    ctx.assert_no_layout_left();
}

#[test]
fn test_closed_input_still_cleans_up() {
    let ctx = TestContext::new();
    let state = ctx.write_state("");
    let answers = ctx.write_answers(&format!(
        r#"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_USER = "admin"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_PASSWORD = "{PASSWORD}"
"#
    ));

    let output = ctx.validate(&state, Some(&answers), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Input closed while waiting for 'OVAAALDAP_LDAP_TOOL_SEQUENCE'"));
    // The menu suggested Done after the successful login
    assert!(stdout(&output).contains("(Done, Abort, Login, Search) [Done]"));

    assert_eq!(ctx.records().len(), 1);
    ctx.assert_no_layout_left();
}

#[test]
fn test_presupplied_credentials() {
    let ctx = TestContext::new();
    let state = ctx.write_state("");
    let answers = ctx.write_answers("OVAAALDAP_LDAP_TOOL_SEQUENCE = \"Done\"\n");

    let mut cmd = ctx.command();
    cmd.env("AAA_TEST_PASSWORD", PASSWORD)
        .arg("validate")
        .arg("--state")
        .arg(&state)
        .arg("--answers")
        .arg(&answers)
        .arg("--tool")
        .arg(env!("CARGO_BIN_EXE_mock-extensions-tool"))
        .args(["--user", "admin", "--password-env", "AAA_TEST_PASSWORD"]);
    let output = cmd.output().expect("Failed to run aaa-ldap-tool");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let records = ctx.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["password"], PASSWORD);
    assert!(args(&records[0]).contains(&"--user-name=admin".to_string()));
    assert!(!stdout(&output).contains("Enter user name"));
    ctx.assert_no_layout_left();
}

#[test]
fn test_sso_profile_search_uses_bare_name() {
    let ctx = TestContext::new();
    let state = ctx.write_state("");
    let content = fs::read_to_string(&state)
        .unwrap()
        .replace("use_vm_sso = false", "use_vm_sso = true");
    fs::write(&state, content).unwrap();
    let answers = ctx.write_answers(&format!(
        r#"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_USER = "admin"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_PASSWORD = "{PASSWORD}"
OVAAALDAP_LDAP_TOOL_SEQUENCE = ["Search", "Done"]
OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_ENTITY = ""
OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_NAME = "john*"
OVAAALDAP_LDAP_TOOL_SEQUENCE_SEARCH_RESOLVE_GROUPS = ""
"#
    ));

    let output = ctx.validate(&state, Some(&answers), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let records = ctx.records();
    assert_eq!(records.len(), 2);
    assert!(args(&records[1]).ends_with(&[
        "aaa".to_string(),
        "search".to_string(),
        "--extension-name=myprofile".to_string(),
        "--entity=Principal".to_string(),
        "--entity-name=john*".to_string(),
    ]));
    ctx.assert_no_layout_left();
}

#[test]
fn test_disabled_tool_skips() {
    let ctx = TestContext::new();
    let state = ctx.write_state("\n[tool]\nenable = false\n");

    let output = ctx.validate(&state, None, &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(ctx.records().is_empty());
    ctx.assert_no_layout_left();
}

#[test]
fn test_missing_tool_is_fatal_and_cleans_up() {
    let ctx = TestContext::new();
    let state = ctx.write_state("");
    let answers = ctx.write_answers(&format!(
        r#"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_USER = "admin"
OVAAALDAP_LDAP_TOOL_SEQUENCE_LOGIN_PASSWORD = "{PASSWORD}"
"#
    ));

    let output = ctx
        .command()
        .arg("validate")
        .arg("--state")
        .arg(&state)
        .arg("--answers")
        .arg(&answers)
        .arg("--tool")
        .arg(ctx.root.join("no-such-tool"))
        .output()
        .expect("Failed to run aaa-ldap-tool");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to start extensions tool"));
    ctx.assert_no_layout_left();
}

#[test]
fn test_inspect_json() {
    let ctx = TestContext::new();
    let state = ctx.write_state("");

    let output = ctx
        .command()
        .arg("inspect")
        .arg("--state")
        .arg(&state)
        .arg("--tool")
        .arg("/opt/engine/bin/ovirt-engine-extensions-tool")
        .arg("--json")
        .output()
        .expect("Failed to run aaa-ldap-tool");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_slice(&output.stdout).expect("JSON output");
    assert_eq!(report["profile"], "myprofile");
    assert_eq!(report["extension_name"], "myprofile-authz");
    assert_eq!(report["tool"], "/opt/engine/bin/ovirt-engine-extensions-tool");
    assert_eq!(report["artifacts"][3]["kind"], "keystore");
    assert_eq!(report["artifacts"][3]["bytes"], KEYSTORE.len() as u64);
    assert_eq!(report["artifacts"][3]["binary"], true);
    ctx.assert_no_layout_left();
}
