//! Runs the built binary to check process-level behavior of the bootstrap.

use prompt_fn::model::catalog::MODELS;
use std::fs;
use std::process::Command;

fn prompt_fn(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_prompt-fn"));
    cmd.current_dir(dir)
        .env_remove("MODELS_DIR")
        .env_remove("FETCH_TOOL")
        .env_remove("PROMPT_BACKEND")
        .env("RUST_LOG", "info");
    cmd
}

#[test]
fn missing_fetch_tool_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let out = prompt_fn(dir.path())
        .args(["fetch", "--models-dir", "."])
        .env("PATH", "")
        .output()
        .unwrap();

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unavailable"), "{stderr}");
    assert!(!MODELS[0].path_in(dir.path()).exists());
}

#[test]
fn explicit_missing_tool_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let out = prompt_fn(dir.path())
        .args(["fetch", "--fetch-tool", "/nonexistent/bin/fetch"])
        .output()
        .unwrap();
    assert!(!out.status.success());
}

#[test]
fn fetch_with_all_models_present_needs_no_tool() {
    let dir = tempfile::tempdir().unwrap();
    for m in MODELS {
        fs::write(m.path_in(dir.path()), b"GGUF").unwrap();
    }
    let out = prompt_fn(dir.path())
        .args(["fetch"])
        .env("PATH", "")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    for m in MODELS {
        assert_eq!(fs::read(m.path_in(dir.path())).unwrap(), b"GGUF");
    }
}
