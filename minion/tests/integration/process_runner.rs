//! Real process execution through the command capability.

#![cfg(unix)]
#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use func_common::{Call, CallArgs, ExecutionResult, FailureKind, MinionConfig};
use func_minion::app::build_agent;
use func_minion::application::ports::ProcessRunner;
use func_minion::application::modules::CommandModule;
use func_minion::infra::TokioProcessRunner;

fn command_module() -> CommandModule<TokioProcessRunner> {
    CommandModule::new(TokioProcessRunner::default(), "which")
}

#[tokio::test]
async fn true_exits_zero_with_no_output() {
    let result = command_module().run("true").await.unwrap();
    assert_eq!(
        result,
        ExecutionResult {
            exit_code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    );
}

#[tokio::test]
async fn false_exits_nonzero_with_no_output() {
    let result = command_module().run("false").await.unwrap();
    assert_ne!(result.exit_code, 0);
    assert!(result.stdout.is_empty());
    assert!(result.stderr.is_empty());
}

#[tokio::test]
async fn stdout_and_stderr_are_captured_separately() {
    let result = command_module()
        .run("ls /nonexistent-func-test-path")
        .await
        .unwrap();
    assert_ne!(result.exit_code, 0);
    assert!(result.stdout.is_empty());
    assert!(!result.stderr.is_empty());

    let result = command_module().run("echo hello   world").await.unwrap();
    assert_eq!(result.stdout, b"hello world\n");
}

#[tokio::test]
async fn shell_syntax_is_passed_through_literally() {
    let result = command_module().run("echo $HOME ; true").await.unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, b"$HOME ; true\n");
}

#[tokio::test]
async fn output_bytes_are_not_decoded() {
    let result = command_module().run(r"printf \377\376").await.unwrap();
    assert_eq!(result.stdout, vec![0xff, 0xfe]);
}

#[tokio::test]
async fn child_gets_no_input() {
    // `cat` with a null stdin sees EOF at once instead of waiting for a tty.
    let result = tokio::time::timeout(Duration::from_secs(10), command_module().run("cat"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn missing_binary_is_an_invocation_error() {
    let err = command_module()
        .run("nonexistent-binary-xyz --flag")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvocationError);
    assert_eq!(err.message, "program not found: nonexistent-binary-xyz");
}

#[tokio::test]
async fn exists_resolves_without_running() {
    let module = command_module();
    assert!(!module.exists("nonexistent-binary-xyz").await.unwrap());
    assert!(module.exists("ls").await.unwrap());
}

#[tokio::test]
async fn timeout_kills_the_child() {
    let module = CommandModule::new(
        TokioProcessRunner::new(Some(Duration::from_millis(200))),
        "which",
    );
    let started = Instant::now();
    let err = module.run("sleep 30").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(10));
}

/// Whether `pid` names a live (not zombie) process.
#[cfg(target_os = "linux")]
fn is_running(pid: i32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    let state = stat
        .rsplit_once(") ")
        .and_then(|(_, rest)| rest.chars().next());
    state != Some('Z')
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn timeout_kills_background_helpers_too() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("helper.pid");
    let script = format!(
        "sleep 4243 & echo $! > {}; sleep 4243",
        pid_file.display()
    );

    let runner = TokioProcessRunner::new(Some(Duration::from_millis(300)));
    let err = runner
        .run("sh", &["-c".to_string(), script])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);

    let helper: i32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while is_running(helper) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!is_running(helper), "background helper {helper} outlived the call");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn child_leads_its_own_process_group() {
    let result = command_module().run("cat /proc/self/stat").await.unwrap();
    let stat = String::from_utf8(result.stdout).unwrap();
    let (pid, rest) = stat.split_once(" (").unwrap();
    // After the command name: state, ppid, pgrp, ...
    let fields: Vec<&str> = rest
        .rsplit_once(") ")
        .unwrap()
        .1
        .split_whitespace()
        .collect();
    assert_eq!(fields[2], pid);
    assert_ne!(fields[2], std::process::id().to_string());
}

#[tokio::test]
async fn exists_refuses_option_like_names() {
    let err = command_module().exists("--version").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidArguments);
}

#[tokio::test]
async fn full_agent_dispatches_real_commands() {
    let config = MinionConfig {
        which_bin: "which".to_string(),
        ..MinionConfig::default()
    };
    let agent = build_agent(&config).unwrap();

    let value = agent
        .dispatch(Call::new("run", CallArgs::positional(["true"])))
        .await
        .unwrap();
    assert_eq!(value["exit_code"], 0);

    let exists = agent
        .dispatch(Call::new("exists", CallArgs::positional(["nonexistent-binary-xyz"])))
        .await
        .unwrap();
    assert_eq!(exists, serde_json::Value::Bool(false));
}

#[tokio::test]
async fn service_without_descriptor_fails_on_a_real_host() {
    let dir = tempfile::tempdir().unwrap();
    let config = MinionConfig {
        init_dirs: vec![dir.path().display().to_string()],
        service_bin: "/nonexistent/service".to_string(),
        ..MinionConfig::default()
    };
    let agent = build_agent(&config).unwrap();

    let err = agent
        .dispatch(Call::new("service_start", CallArgs::positional(["httpd"])))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::PreconditionFailed);
    assert_eq!(err.message, "service not installed: httpd");
}
