//! Runs the `aspx-check` binary against fixture and temporary workspaces.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test-fixtures")
}

fn run(workspace: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aspx-check"))
        .arg("--workspace")
        .arg(workspace)
        .args(extra)
        .output()
        .expect("failed to run aspx-check")
}

#[derive(Debug, Deserialize)]
struct JsonDiagnostic {
    #[serde(rename = "type")]
    diagnostic_type: String,
    filename: String,
    start: JsonPosition,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonPosition {
    line: u32,
    column: u32,
}

fn json_diagnostics(output: &Output) -> Vec<JsonDiagnostic> {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_valid_fixtures_pass() {
    let output = run(&fixtures_dir().join("valid"), &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("aspx-check found 0 errors in 0 of 4 files"));
}

#[test]
fn test_invalid_fixture_fails_with_json_errors() {
    let output = run(&fixtures_dir().join("invalid"), &["--output", "json"]);
    assert_eq!(output.status.code(), Some(1));

    let diagnostics = json_diagnostics(&output);
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "duplicate attribute: id",
            "unexpected closing tag: </asp:Repeater>",
            "Unknown web control: asp:Widget",
            "unterminated code block",
        ]
    );
    assert!(diagnostics
        .iter()
        .all(|d| d.diagnostic_type == "Error" && d.filename == "Broken.aspx"));
    assert!(diagnostics
        .windows(2)
        .all(|pair| pair[0].start.line <= pair[1].start.line));
}

#[test]
fn test_errors_are_printed_in_path_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b/Page.aspx"), "\n<asp:Nope runat=\"server\" />").unwrap();
    fs::write(dir.path().join("a.aspx"), "</asp:Panel>").unwrap();

    let output = run(dir.path(), &["--output", "machine"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "ERROR a.aspx:1:1:1:13 unexpected closing tag: </asp:Panel>",
            "ERROR b/Page.aspx:2:1:2:28 Unknown web control: asp:Nope",
        ]
    );
}

#[test]
fn test_config_registers_custom_controls() {
    let dir = tempfile::tempdir().unwrap();
    let page = r#"<ajax:UpdatePanel ID="Up" runat="server"><ContentTemplate>Hi</ContentTemplate></ajax:UpdatePanel>"#;
    fs::write(dir.path().join("Default.aspx"), page).unwrap();

    let output = run(dir.path(), &["--output", "json"]);
    let diagnostics = json_diagnostics(&output);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Unknown web control: ajax:UpdatePanel");
    assert_eq!((diagnostics[0].start.line, diagnostics[0].start.column), (1, 1));

    fs::write(
        dir.path().join("aspx.config.json"),
        r#"{
            "controls": [
                {
                    "prefix": "ajax",
                    "name": "UpdatePanel",
                    "type": "System.Web.UI.UpdatePanel",
                    "childrenAsProperties": true,
                    "dataTypes": { "ContentTemplate": { "kind": "template" } }
                }
            ]
        }"#,
    )
    .unwrap();

    let output = run(dir.path(), &["--output", "json", "--emit-tree"]);
    assert!(output.status.success());
    assert!(json_diagnostics(&output).is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("=== Tree for Default.aspx ==="));
    assert!(stderr.contains("System.Web.UI.UpdatePanel#Up"));
    assert!(stderr.contains(".ContentTemplate ="));
}

#[test]
fn test_ignore_flag_skips_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("legacy")).unwrap();
    fs::write(dir.path().join("legacy/Old.aspx"), "<asp:Gone runat=\"server\" />").unwrap();

    let output = run(dir.path(), &["--ignore", "legacy/**"]);
    assert!(output.status.success());
}

#[test]
fn test_invalid_config_is_a_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("aspx.config.json"), "{ not json").unwrap();

    let output = run(dir.path(), &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid configuration"));
}
