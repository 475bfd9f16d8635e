// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, warn, Instrument};

use buildlet_wire::ProcessState;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to wait on child: {0}")]
    Wait(#[source] io::Error),
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub dir: PathBuf,
    /// Fully assembled `key=value` pairs, replacing the spawned process's
    /// environment entirely (the caller has already merged base, cache,
    /// and client env via [`crate::assemble_env`]).
    pub env: Vec<String>,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub state: ProcessState,
}

/// Spawns `req`, forwards its combined stdout/stderr to `sink` as it
/// runs, and returns the terminal [`ProcessState`] once it exits. If
/// `cancel` fires first -- the client disconnected mid-stream -- the
/// whole process group is killed instead of waiting it out.
pub async fn run<W>(
    req: RunRequest,
    mut sink: W,
    cancel: CancellationToken,
) -> Result<ExecOutcome, RunError>
where
    W: AsyncWrite + Unpin + Send,
{
    let span = info_span!("exec.run", command = %req.command.display(), debug = req.debug);

    let mut command = Command::new(&req.command);
    command.args(&req.args);
    command.current_dir(&req.dir);
    command.env_clear();
    for kv in &req.env {
        if let Some((k, v)) = kv.split_once('=') {
            command.env(k, v);
        }
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.kill_on_drop(true);

    #[cfg(unix)]
    command.process_group(0);

    async move {
        let mut child = command.spawn().map_err(|source| RunError::Spawn {
            command: req.command.clone(),
            source,
        })?;
        let pid = child.id();

        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(32);
        let out_task = tokio::spawn(forward(stdout, tx.clone()));
        let err_task = tokio::spawn(forward(stderr, tx));

        let forward_to_sink = async {
            while let Some(chunk) = rx.recv().await {
                if sink.write_all(&chunk).await.is_err() {
                    break;
                }
            }
        };

        let state = tokio::select! {
            _ = forward_to_sink => {
                let _ = out_task.await;
                let _ = err_task.await;
                wait_for_state(&mut child).await?
            }
            _ = cancel.cancelled() => {
                warn!(?pid, "client disconnected, killing process tree");
                kill_tree(pid);
                let _ = child.wait().await;
                ProcessState::Signaled("killed".to_string())
            }
        };

        Ok(ExecOutcome { state })
    }
    .instrument(span)
    .await
}

async fn forward<R: AsyncRead + Unpin>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn wait_for_state(child: &mut tokio::process::Child) -> Result<ProcessState, RunError> {
    let status = child.wait().await.map_err(RunError::Wait)?;
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Ok(ProcessState::Signaled(
                nix::sys::signal::Signal::try_from(signal)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| signal.to_string()),
            ));
        }
    }
    Ok(ProcessState::Exited(status.code().unwrap_or(-1)))
}

#[cfg(unix)]
fn kill_tree(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_tree(_pid: Option<u32>) {}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod runner_tests;
