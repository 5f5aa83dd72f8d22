//! Serve command: a local stdio harness for the agent surface.
//!
//! Reads one JSON request per line from stdin:
//! `{"id": <any>, "operation": "...", "args": [...], "kwargs": {...}}`.
//! Each request is dispatched on its own worker and answered with one JSON
//! line on stdout carrying the same `id` plus `ok` or `error`. Responses are
//! written as calls finish, so they may arrive out of request order.

use std::future::Future;

use anyhow::{Context, Result};
use func_common::{Call, OperationFailure};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::application::AgentSurface;
use crate::commands::call::envelope;

/// Encode one response line. `id` is echoed verbatim.
fn response_line(id: Value, outcome: &Result<Value, OperationFailure>) -> String {
    let mut body = envelope(outcome);
    if let Value::Object(map) = &mut body {
        map.insert("id".to_string(), id);
    }
    body.to_string()
}

fn malformed(id: Value, err: &serde_json::Error) -> String {
    let failure = OperationFailure::invalid_arguments(format!("malformed request: {err}"));
    response_line(id, &Err(failure))
}

/// Parse one request line into its `id` and call.
///
/// A malformed line is answered, not fatal. The `id` is taken before the
/// call is decoded, so a well-formed object with bad arguments is still
/// answered under its own `id`.
fn parse_request(line: &str) -> std::result::Result<(Value, Call), String> {
    let mut raw: Value = serde_json::from_str(line).map_err(|e| malformed(Value::Null, &e))?;
    let id = raw
        .as_object_mut()
        .and_then(|fields| fields.remove("id"))
        .unwrap_or(Value::Null);
    match serde_json::from_value::<Call>(raw) {
        Ok(call) => Ok((id, call)),
        Err(e) => Err(malformed(id, &e)),
    }
}

/// Join every worker that has already finished. Returns how many were joined.
fn reap_finished(inflight: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = inflight.try_join_next() {
        if let Err(e) = joined {
            tracing::error!(error = %e, "request worker did not complete");
        }
        reaped += 1;
    }
    reaped
}

/// Serve on stdio until stdin closes or Ctrl-C, then wait for in-flight calls.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub async fn run(agent: AgentSurface) -> Result<()> {
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received shutdown signal"),
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for Ctrl-C; serving until stdin closes");
                std::future::pending::<()>().await;
            }
        }
    };
    serve(
        agent,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown,
    )
    .await?;
    Ok(())
}

/// Answer every request line read from `input` on `output` until `input`
/// ends or `shutdown` resolves. Returns `output` once all calls are answered.
///
/// # Errors
///
/// Returns an error if `input` cannot be read or `output` cannot be written.
pub async fn serve<R, W, S>(agent: AgentSurface, input: R, output: W, shutdown: S) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    S: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut output = output;
        while let Some(line) = rx.recv().await {
            output.write_all(line.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok::<_, std::io::Error>(output)
    });

    tracing::info!(operations = agent.operations().len(), "serving calls");
    let mut lines = input.lines();
    let mut inflight = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read request")?,
            () = &mut shutdown => break,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match parse_request(&line) {
            Ok((id, call)) => {
                let agent = agent.clone();
                let tx = tx.clone();
                inflight.spawn(async move {
                    let outcome = agent.dispatch(call).await;
                    let _ = tx.send(response_line(id, &outcome));
                });
            }
            Err(response) => {
                tracing::warn!("malformed request line");
                let _ = tx.send(response);
            }
        }
        reap_finished(&mut inflight);
    }

    while let Some(joined) = inflight.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "request worker did not complete");
        }
    }
    drop(tx);
    let output = writer
        .await
        .context("response writer task failed")?
        .context("failed to write response")?;
    tracing::info!("server shut down");
    Ok(output)
}
