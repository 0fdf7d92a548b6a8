//! CLI tests for `transcrypt-transform transform` with a stand-in toolchain.
//!
//! The configured command runs a small shell script that behaves like
//! Transcrypt: it writes the module and its run manifest under `.build/`.
#![cfg(unix)]

use std::process::{Command, Output};

use transformer::exit_codes;
use transformer::test_support::TestProject;

const FAKE_TOOLCHAIN: &str = r#"#!/bin/sh
mkdir -p .build
echo 'export var greeting = "hi";' > .build/app.js
printf '{"modules": [{"source": "src/app.py"}]}' > .build/app.project
echo "Saving target code in: .build/app.js"
"#;

const FAILING_TOOLCHAIN: &str = r#"#!/bin/sh
echo "Error while compiling (offending file last):"
echo "SyntaxError: invalid syntax (app.py, line 1)" >&2
exit 1
"#;

fn project_with_toolchain(script: &str) -> TestProject {
    let project = TestProject::new().expect("project");
    project.write("src/app.py", "greeting = 'hi'\n").expect("source");
    let tool = project.write("tools/transcrypt", script).expect("script");
    let section = serde_json::json!({
        "command": format!("sh {}", tool.display()),
        "transcryptVersion": "3.9",
    });
    project
        .write_package_json(&section.to_string())
        .expect("package.json");
    project
}

fn run_transform(project: &TestProject, mode: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_transcrypt-transform"))
        .current_dir(project.root())
        .args(["transform", "src/app.py", "--mode", mode])
        .env("RUST_LOG", "off")
        .output()
        .expect("transcrypt-transform transform")
}

#[test]
fn transform_prints_reexport_and_writes_output() {
    let project = project_with_toolchain(FAKE_TOOLCHAIN);
    let output = run_transform(&project, "development");

    assert_eq!(
        output.status.code(),
        Some(exit_codes::OK),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"export * from "../.build/app.js";"#
    );
    assert!(project.root().join(".build/app.js").is_file());
}

#[test]
fn toolchain_failure_exits_with_toolchain_code() {
    let project = project_with_toolchain(FAILING_TOOLCHAIN);
    let output = run_transform(&project, "production");

    assert_eq!(output.status.code(), Some(exit_codes::TOOLCHAIN_FAILED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SyntaxError: invalid syntax"), "{stderr}");
    assert!(stderr.contains("exit code 1"), "{stderr}");
}
