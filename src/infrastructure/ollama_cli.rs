//! Completions through `ollama run`.

use crate::core::completion::{self, CompletionError, INFERENCE_TIMEOUT};
use crate::core::traits::Completer;
use crate::infrastructure::config::GatewayConfig;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::{debug, warn};
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Stderr marker Ollama prints when the model has not been pulled yet.
const MISSING_MANIFEST: &str = "pull model manifest";

pub struct CliCompleter {
    binary: String,
    model: String,
    timeout: Duration,
}

#[injectable(Completer)]
impl CliCompleter {
    #[inject]
    pub fn create(config: Ref<GatewayConfig>) -> CliCompleter {
        CliCompleter::new(&config.ollama_bin, &config.model)
    }
}

impl CliCompleter {
    pub fn new(binary: &str, model: &str) -> Self {
        Self {
            binary: binary.to_owned(),
            model: model.to_owned(),
            timeout: INFERENCE_TIMEOUT,
        }
    }

    /// Overrides the per-invocation ceiling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, prompt: &str) -> Result<String, CompletionError> {
        let mut child = Command::new(&self.binary)
            .arg("run")
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.launch_error(e))?;

        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            // a child that exits without reading its input is judged by its exit status
            match stdin.write_all(prompt.as_bytes()).await {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };
        let exchange = async {
            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            fed?;
            output
        };

        // dropping `exchange` on expiry drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(output) => output.map_err(|e| self.launch_error(e))?,
            Err(_) => return Err(CompletionError::Timeout),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            debug!("{} exited with {}", self.binary, output.status);

            if stderr.to_lowercase().contains(MISSING_MANIFEST) {
                return Err(CompletionError::ModelMissing {
                    model: self.model.clone(),
                });
            }
            return Err(CompletionError::Failed(if stderr.is_empty() {
                "unknown failure".to_owned()
            } else {
                stderr.to_owned()
            }));
        }

        Ok(completion::finish(&String::from_utf8_lossy(&output.stdout)))
    }

    fn launch_error(&self, e: io::Error) -> CompletionError {
        if e.kind() == io::ErrorKind::NotFound {
            CompletionError::BinaryNotFound(self.binary.clone())
        } else {
            CompletionError::Launch {
                kind: format!("{:?}", e.kind()),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Completer for CliCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let result = self.run(prompt).await;
        if let Err(e) = &result {
            warn!("ollama cli completion failed: {e}");
        }
        result
    }

    fn mode(&self) -> &'static str {
        "cli"
    }
}
