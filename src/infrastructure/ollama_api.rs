//! Completions through the Ollama HTTP API.

use crate::core::completion::{self, CompletionError, INFERENCE_TIMEOUT};
use crate::core::traits::Completer;
use crate::infrastructure::config::GatewayConfig;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::time::Duration;

/// Longest slice of an error body quoted back to the caller.
const ERROR_BODY_CHARS: usize = 400;

#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One line of the `/api/generate` NDJSON stream.
#[derive(Deserialize, Debug)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
}

pub struct ApiCompleter {
    client: reqwest::Client,
    generate_url: String,
    model: String,
    timeout: Duration,
}

#[injectable(Completer)]
impl ApiCompleter {
    #[inject]
    pub fn create(config: Ref<GatewayConfig>) -> ApiCompleter {
        ApiCompleter::new(&config.ollama_host, &config.model)
    }
}

impl ApiCompleter {
    pub fn new(ollama_host: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            generate_url: format!("{}/api/generate", ollama_host.trim_end_matches('/')),
            model: model.to_owned(),
            timeout: INFERENCE_TIMEOUT,
        }
    }

    /// Overrides the request ceiling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(&self.generate_url)
            .timeout(self.timeout)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: true,
            })
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(CompletionError::ModelNotFound {
                    model: self.model.clone(),
                });
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(CompletionError::Status {
                    status: status.as_u16(),
                    body: body.chars().take(ERROR_BODY_CHARS).collect(),
                });
            }
        }

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut output = String::new();
        let mut done = false;

        while !done {
            let Some(chunk) = stream.next().await else {
                break;
            };
            pending.extend_from_slice(&chunk.map_err(transport_error)?);

            while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline).collect();
                if accumulate(&line, &mut output) {
                    done = true;
                    break;
                }
            }
        }

        if !done {
            // stream closed without a trailing newline
            accumulate(&pending, &mut output);
        }

        debug!("ollama api produced {} chars", output.len());
        Ok(completion::finish(&output))
    }
}

#[async_trait]
impl Completer for ApiCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let result = self.generate(prompt).await;
        if let Err(e) = &result {
            warn!("ollama api completion failed: {e}");
        }
        result
    }

    fn mode(&self) -> &'static str {
        "api"
    }
}

/// Appends the fragment carried by one NDJSON line. Returns `true` once the backend says it is done.
///
/// Blank and unparseable lines are skipped.
fn accumulate(line: &[u8], output: &mut String) -> bool {
    let line = line.trim_ascii();
    if line.is_empty() {
        return false;
    }

    match serde_json::from_slice::<GenerateChunk>(line) {
        Ok(chunk) => {
            if let Some(fragment) = chunk.response {
                output.push_str(&fragment);
            }
            chunk.done
        }
        Err(e) => {
            debug!("skipping unparseable stream line: {e}");
            false
        }
    }
}

/// Transport failure with its full cause chain, so timeouts read as timeouts.
fn transport_error(e: reqwest::Error) -> CompletionError {
    let mut detail = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    CompletionError::Unreachable(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_appends_fragments() {
        let mut output = String::new();
        assert!(!accumulate(br#"{"response":"Hel","done":false}"#, &mut output));
        assert!(!accumulate(b"{\"response\":\"lo\"}\n", &mut output));
        assert_eq!(output, "Hello");
    }

    #[test]
    fn test_accumulate_reports_done() {
        let mut output = String::new();
        assert!(accumulate(br#"{"response":"!","done":true}"#, &mut output));
        assert_eq!(output, "!");
    }

    #[test]
    fn test_accumulate_skips_garbage_and_blank_lines() {
        let mut output = String::from("keep");
        assert!(!accumulate(b"not json", &mut output));
        assert!(!accumulate(b"   \r\n", &mut output));
        assert!(!accumulate(b"[1, 2]", &mut output));
        assert!(!accumulate(br#"{"model":"gemma3:4b"}"#, &mut output));
        assert_eq!(output, "keep");
    }

    #[test]
    fn test_generate_url_joins_host() {
        let completer = ApiCompleter::new("http://localhost:11434/", "m");
        assert_eq!(completer.generate_url, "http://localhost:11434/api/generate");
        assert_eq!(completer.timeout, INFERENCE_TIMEOUT);
    }
}
