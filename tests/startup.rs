//! Startup of the `hxrepl` binary when the toolchain cannot be used

use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn hxrepl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hxrepl"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[cfg(unix)]
fn script(dir: &Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    path.to_string_lossy().into_owned()
}

#[test]
#[cfg(unix)]
fn t_failing_compiler_probe_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let haxe = script(
        dir.path(),
        "haxe",
        "echo 'Error: std library not found' >&2\nexit 1",
    );

    let out = hxrepl(&["--haxe", &haxe]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Error: std library not found"));
    assert!(!String::from_utf8_lossy(&out.stdout).contains("REPL Haxe"));
}

#[test]
fn t_missing_compiler_is_reported() {
    let out = hxrepl(&["--haxe", "/no/such/hxrepl/haxe"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("/no/such/hxrepl/haxe"));
}

#[test]
#[cfg(unix)]
fn t_missing_node_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let haxe = script(dir.path(), "haxe", "echo 4.3.4");

    let out = hxrepl(&["--haxe", &haxe, "--node", "/no/such/hxrepl/node"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("/no/such/hxrepl/node"));
}

#[test]
fn t_bad_working_directory_is_reported() {
    let out = hxrepl(&["--pwd", "/no/such/hxrepl/dir"]);

    assert_ne!(out.status.code(), Some(0));
    assert!(stderr(&out).contains("/no/such/hxrepl/dir"));
}
