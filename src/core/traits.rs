//! DI "Interfaces"

use crate::core::completion::{self, CompletionError};
use crate::core::sessions::Role;
use async_trait::async_trait;
use std::path::Path;

/// A way of turning a prompt into model text.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Runs the prompt against the backend.
    ///
    /// `Ok` text is already trimmed, sanitized and never empty.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Like [`Completer::complete`], with failures rendered as `Error: ...` text.
    async fn complete_text(&self, prompt: &str) -> String {
        completion::render(self.complete(prompt).await)
    }

    /// `"api"` or `"cli"`, reported by `/health`.
    fn mode(&self) -> &'static str;
}

/// Backend that the primary `/chat` flow and the debug routes delegate to.
#[async_trait]
pub trait TaskRouter: Send + Sync {
    /// Produces the reply for a chat prompt.
    async fn route_task(&self, prompt: &str) -> String;

    /// The most recent prompt handed to [`TaskRouter::route_task`], empty before the first one.
    fn last_prompt(&self) -> String;

    /// JSON file holding the persisted memory, including greeting flags.
    fn memory_file(&self) -> &Path;
}

/// Rolling per-session conversation history for the remote chat flow.
pub trait SessionStore: Send + Sync {
    /// Appends a turn, creating the session if needed and keeping only the newest turns.
    fn append_turn(&self, session_id: &str, role: Role, text: &str);

    /// The newest turns of a session as `User: ...` / `Kouri: ...` lines, or `""`.
    fn build_context(&self, session_id: &str) -> String;

    /// Snapshot of `(session id, stored turn count)`.
    fn list_sessions(&self) -> Vec<(String, usize)>;

    /// Forgets a session. Unknown ids are ignored.
    fn reset(&self, session_id: &str);
}
