//! Infrastructure implementation of the `ProcessRunner` port.
//!
//! `TokioProcessRunner` is the single place the minion spawns host programs.
//! Arguments are passed as discrete argv tokens, never through a shell. The
//! child gets a null stdin, so it cannot be prompted for input. On unix it
//! also leads its own process group, which is a background group of the
//! minion's session: a child that opens the terminal itself is stopped by
//! the kernel, so set a timeout when such programs may be called. Stdout and
//! stderr are captured in full as raw bytes.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use func_common::{ExecutionResult, OperationFailure};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout};

use crate::application::ports::ProcessRunner;

/// Production `ProcessRunner` backed by `tokio::process`.
///
/// With no timeout a call lasts as long as the child does. With a timeout,
/// the child's whole process group is killed when it expires, so helpers it
/// started in the background do not outlive the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner {
    timeout: Option<Duration>,
}

impl TokioProcessRunner {
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<ExecutionResult, OperationFailure> {
        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| spawn_failure(program, &e))?;
        tracing::debug!(program, ?args, pid = child.id(), "spawned host program");

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();

        let result = match self.timeout {
            None => collect(&mut child, stdout_handle, stderr_handle, program).await,
            Some(limit) => tokio::select! {
                result = collect(&mut child, stdout_handle, stderr_handle, program) => result,
                () = tokio::time::sleep(limit) => {
                    kill_process_group(&mut child, program).await;
                    tracing::warn!(program, timeout_secs = limit.as_secs(), "host program timed out");
                    return Err(OperationFailure::timeout(format!(
                        "{program} timed out after {}s",
                        limit.as_secs()
                    )));
                }
            },
        }?;

        tracing::debug!(program, exit_code = result.exit_code, "host program exited");
        Ok(result)
    }
}

/// Wait for the child while draining both pipes, so a chatty child cannot
/// block on a full pipe buffer.
async fn collect(
    child: &mut Child,
    mut stdout_handle: Option<ChildStdout>,
    mut stderr_handle: Option<ChildStderr>,
    program: &str,
) -> Result<ExecutionResult, OperationFailure> {
    let (status, stdout, stderr) = tokio::join!(
        child.wait(),
        async {
            let mut buf = Vec::new();
            if let Some(ref mut h) = stdout_handle {
                let _ = h.read_to_end(&mut buf).await;
            }
            buf
        },
        async {
            let mut buf = Vec::new();
            if let Some(ref mut h) = stderr_handle {
                let _ = h.read_to_end(&mut buf).await;
            }
            buf
        },
    );
    let status = status.map_err(|e| {
        OperationFailure::invocation(format!("waiting for {program}: {}", e.kind()))
    })?;
    Ok(ExecutionResult {
        exit_code: exit_code(status),
        stdout,
        stderr,
    })
}

/// Kill the child and everything left in its process group, then reap it.
async fn kill_process_group(child: &mut Child, program: &str) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) {
            if let Err(errno) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::debug!(program, pid, %errno, "process group already gone");
            }
        }
    }
    let _ = child.kill().await;
}

/// Map a spawn fault to a failure that names the program but not the
/// platform's own error text.
fn spawn_failure(program: &str, err: &io::Error) -> OperationFailure {
    let reason = match err.kind() {
        io::ErrorKind::NotFound => "program not found".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        other => format!("spawn failed ({other})"),
    };
    tracing::warn!(program, %reason, "could not spawn host program");
    OperationFailure::invocation(format!("{reason}: {program}"))
}

/// Exit code, or the negated signal number for a child killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
