use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{ProviderConfig, ProviderError, ProviderOutput};

/// Utility for running one provider process to completion
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Spawn `binary`, feed `input` on stdin and capture both output streams.
    ///
    /// A configured timeout covers the whole lifecycle. The child is spawned
    /// with `kill_on_drop`, so an expired timeout also kills the process.
    pub async fn spawn(
        binary: &Path,
        args: &[String],
        input: &str,
        config: &ProviderConfig,
    ) -> Result<ProviderOutput, ProviderError> {
        match config.timeout {
            Some(limit) => tokio::time::timeout(limit, Self::run(binary, args, input, config))
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => Self::run(binary, args, input, config).await,
        }
    }

    async fn run(
        binary: &Path,
        args: &[String],
        input: &str,
        config: &ProviderConfig,
    ) -> Result<ProviderOutput, ProviderError> {
        let start = Instant::now();

        debug!(
            binary = %binary.display(),
            args = ?args,
            input_len = input.len(),
            "Spawning provider process"
        );

        let mut cmd = Command::new(binary);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = config.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &config.env_vars {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProviderError::ExecutionFailed("stdin not captured".into()))?;
        let mut stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| ProviderError::ExecutionFailed("stdout not captured".into()))?;
        let mut stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| ProviderError::ExecutionFailed("stderr not captured".into()))?;

        // Feed stdin while draining both pipes, otherwise a chatty child can
        // fill its stdout pipe and deadlock against our write.
        let write_input = async move {
            let result = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            match result {
                // The child may exit without reading everything; that is its call.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        let read_stdout = stdout_handle.read_to_end(&mut stdout_buf);
        let read_stderr = stderr_handle.read_to_end(&mut stderr_buf);

        tokio::try_join!(write_input, read_stdout, read_stderr).map_err(|e| {
            ProviderError::ExecutionFailed(format!("Failed to exchange data with process: {}", e))
        })?;

        let status = child.wait().await?;
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&stdout_buf).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_buf).into_owned();
        trace!(stdout = %stdout, stderr = %stderr, "Provider streams");

        debug!(
            exit_code = status.code().unwrap_or(-1),
            duration_ms = duration.as_millis(),
            "Provider process completed"
        );

        Ok(ProviderOutput::new(
            stdout,
            stderr,
            status.code().unwrap_or(-1),
            duration,
        ))
    }
}
