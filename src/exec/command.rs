// src/exec/command.rs

//! Real process runner backed by `tokio::process`.

use std::process::Stdio;

use anyhow::{Context, bail};
use tokio::process::Command;
use tracing::{debug, info};

use super::backend::{CommandOutput, CommandRunner, RunFuture};

/// Runner that spawns OS processes.
#[derive(Debug, Clone, Default)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommandRunner {
    fn run_capture<'a>(&'a self, program: &'a str, args: &'a [String]) -> RunFuture<'a> {
        Box::pin(async move {
            info!(program, ?args, "running config command");

            let output = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .with_context(|| format!("spawning process `{program}`"))?;

            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            for line in stderr.lines() {
                debug!(program, "stderr: {}", line);
            }

            if !output.status.success() {
                let code = output.status.code().unwrap_or(-1);
                bail!(
                    "`{program}` exited with status {code}: {}",
                    stderr.trim()
                );
            }

            let stdout = String::from_utf8(output.stdout)
                .with_context(|| format!("`{program}` wrote non-UTF-8 output"))?;

            debug!(program, bytes = stdout.len(), "config command finished");
            Ok(CommandOutput { stdout, stderr })
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let runner = RealCommandRunner::new();
        let args = vec!["-c".to_string(), "printf 'watch: true'".to_string()];
        let out = runner.run_capture("sh", &args).await.unwrap();
        assert_eq!(out.stdout, "watch: true");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let runner = RealCommandRunner::new();
        let args = vec!["-c".to_string(), "echo nope >&2; exit 3".to_string()];
        let err = runner.run_capture("sh", &args).await.unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("status 3"), "{text}");
        assert!(text.contains("nope"), "{text}");
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error() {
        let runner = RealCommandRunner::new();
        let err = runner
            .run_capture("definitely-not-a-real-binary-xyz", &[])
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("spawning process"));
    }
}
