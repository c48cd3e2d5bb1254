//! Process-backed generation client.
//!
//! Spawns a configured command, writes the rendered prompt to its stdin and
//! reads the document text from stdout. Tuning settings travel as a JSON
//! object in the `DRAFTSMAN_TUNING` environment variable.

use super::{GenerationClient, GenerationRequest, prompt};
use crate::errors::GenerationError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Environment variable carrying the serialized tuning settings.
pub const TUNING_ENV: &str = "DRAFTSMAN_TUNING";

/// Runs an external generator command per request.
#[derive(Debug, Clone)]
pub struct CommandClient {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl CommandClient {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: Duration::from_secs(600),
            working_dir: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    async fn run(&self, prompt: &str, tuning: &str) -> Result<String, GenerationError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .env(TUNING_ENV, tuning)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| GenerationError::Spawn {
            command: self.command.clone(),
            source,
        })?;
        debug!(pid = child.id().unwrap_or(0), command = %self.command, "Generator spawned");

        if let Some(mut stdin) = child.stdin.take() {
            // A generator that exits without reading its input is judged by its exit status.
            match stdin.write_all(prompt.as_bytes()).await {
                Ok(()) => {
                    let _ = stdin.shutdown().await;
                }
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(GenerationError::backend(format!(
                        "failed to write prompt to generator: {}",
                        e
                    )));
                }
            }
        }

        let output = child.wait_with_output().await.map_err(|e| {
            GenerationError::backend(format!("failed to read generator output: {}", e))
        })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenerationError::backend(format!(
                "generator exited with {}: {}",
                code,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::backend("generator produced no output"));
        }
        Ok(text)
    }
}

#[async_trait]
impl GenerationClient for CommandClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let prompt = prompt::render(request, request.structured);
        let tuning = serde_json::to_string(&request.tuning)
            .map_err(|e| GenerationError::backend(format!("failed to encode tuning: {}", e)))?;

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.run(&prompt, &tuning)).await;
        let text = match result {
            Ok(inner) => inner?,
            Err(_) => {
                return Err(GenerationError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        info!(
            target = %request.target.label(),
            chars = text.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generation finished"
        );
        Ok(text)
    }
}
