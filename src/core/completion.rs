//! Completion outcomes shared by both inference strategies.
//!
//! Backends report failures as [`CompletionError`]; the HTTP layer never sees them as errors
//! because [`render`] turns them into the `Error: ...` text the chat UI displays verbatim.

use crate::core::sanitize::strip_ansi;
use std::time::Duration;
use thiserror::Error;

/// Substituted whenever a backend produces nothing printable.
pub const NO_OUTPUT: &str = "(no output)";

/// Ceiling on every backend call, request and stream included.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("cannot reach Ollama API: {0}")]
    Unreachable(String),

    #[error("model '{model}' not found (404). Try: ollama pull {model}")]
    ModelNotFound { model: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model inference timed out.")]
    Timeout,

    #[error("ollama binary '{0}' not found.")]
    BinaryNotFound(String),

    #[error("{kind}: {message}")]
    Launch { kind: String, message: String },

    #[error("model '{model}' missing. Run: ollama pull {model}")]
    ModelMissing { model: String },

    #[error("{0}")]
    Failed(String),
}

/// Trims raw backend output, strips terminal escapes, and falls back to [`NO_OUTPUT`].
pub fn finish(raw: &str) -> String {
    let text = strip_ansi(raw.trim());
    if text.is_empty() {
        NO_OUTPUT.to_owned()
    } else {
        text
    }
}

/// Flattens a backend outcome into the text returned to callers.
pub fn render(outcome: Result<String, CompletionError>) -> String {
    match outcome {
        Ok(text) => text,
        Err(e) => format!("Error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_trims_and_strips() {
        assert_eq!(finish("  \x1b[32mhello\x1b[0m \n"), "hello");
    }

    #[test]
    fn test_finish_substitutes_placeholder() {
        assert_eq!(finish(""), NO_OUTPUT);
        assert_eq!(finish(" \n\t "), NO_OUTPUT);
        assert_eq!(finish("\x1b[2K\x1b[1G"), NO_OUTPUT);
    }

    #[test]
    fn test_render_model_not_found() {
        let text = render(Err(CompletionError::ModelNotFound {
            model: "gemma3:4b".into(),
        }));
        assert_eq!(
            text,
            "Error: model 'gemma3:4b' not found (404). Try: ollama pull gemma3:4b"
        );
    }

    #[test]
    fn test_render_cli_failures() {
        assert_eq!(
            render(Err(CompletionError::Timeout)),
            "Error: model inference timed out."
        );
        assert_eq!(
            render(Err(CompletionError::BinaryNotFound("ollama".into()))),
            "Error: ollama binary 'ollama' not found."
        );
        assert_eq!(
            render(Err(CompletionError::Launch {
                kind: "PermissionDenied".into(),
                message: "permission denied".into(),
            })),
            "Error: PermissionDenied: permission denied"
        );
    }

    #[test]
    fn test_render_passes_success_through() {
        assert_eq!(render(Ok("hi".into())), "hi");
    }
}
