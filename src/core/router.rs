//! Task router used by the primary chat flow.

use crate::core::traits::{Completer, TaskRouter};
use crate::infrastructure::config::GatewayConfig;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Sends every task straight to the configured [`Completer`], remembering the last prompt.
pub struct PassthroughRouter {
    completer: Ref<dyn Completer>,
    memory_file: PathBuf,
    last_prompt: Mutex<String>,
}

#[injectable(TaskRouter)]
impl PassthroughRouter {
    #[inject]
    pub fn create(completer: Ref<dyn Completer>, config: Ref<GatewayConfig>) -> PassthroughRouter {
        PassthroughRouter::new(completer, config.memory_file.clone())
    }
}

impl PassthroughRouter {
    pub fn new(completer: Ref<dyn Completer>, memory_file: PathBuf) -> Self {
        Self {
            completer,
            memory_file,
            last_prompt: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl TaskRouter for PassthroughRouter {
    async fn route_task(&self, prompt: &str) -> String {
        *self.last_prompt.lock().unwrap_or_else(PoisonError::into_inner) = prompt.to_owned();
        debug!("routing task ({} chars) to {} completer", prompt.len(), self.completer.mode());

        self.completer.complete_text(prompt).await
    }

    fn last_prompt(&self) -> String {
        self.last_prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn memory_file(&self) -> &Path {
        &self.memory_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::completion::CompletionError;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl Completer for Echo {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            Ok(format!("echo: {prompt}"))
        }

        fn mode(&self) -> &'static str {
            "api"
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Completer for Unreachable {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Unreachable("connection refused".into()))
        }

        fn mode(&self) -> &'static str {
            "api"
        }
    }

    #[tokio::test]
    async fn test_route_task_records_last_prompt() {
        let router = PassthroughRouter::new(Arc::new(Echo), PathBuf::from("memory.json"));
        assert_eq!(router.last_prompt(), "");

        let reply = router.route_task("first").await;
        router.route_task("second").await;

        assert_eq!(reply, "echo: first");
        assert_eq!(router.last_prompt(), "second");
        assert_eq!(router.memory_file(), Path::new("memory.json"));
    }

    #[tokio::test]
    async fn test_route_task_renders_failures() {
        let router = PassthroughRouter::new(Arc::new(Unreachable), PathBuf::from("m.json"));

        assert_eq!(
            router.route_task("hi").await,
            "Error: cannot reach Ollama API: connection refused"
        );
    }
}
