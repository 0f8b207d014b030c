//! Persisted-memory file maintenance

use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value, json};
use std::path::Path;
use thiserror::Error;

/// Flags the greeting logic sets once it has said hello.
pub const GREETING_FLAGS: [&str; 2] = ["greeted", "greeting_sanitized"];

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("failed to encode memory file: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write memory file: {0}")]
    Write(#[from] std::io::Error),
}

/// Removes the greeting flags from the memory file so the next chat greets again.
///
/// A missing or unreadable file is treated as an empty memory with no history.
pub async fn clear_greeting_flags(path: &Path) -> Result<(), MemoryError> {
    let mut memory = match tokio::fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Map<String, Value>>(&bytes) {
            Ok(memory) => memory,
            Err(e) => {
                debug!("memory file {} is not a JSON object: {e}", path.display());
                empty_memory()
            }
        },
        Err(e) => {
            debug!("memory file {} unreadable: {e}", path.display());
            empty_memory()
        }
    };

    for flag in GREETING_FLAGS {
        memory.remove(flag);
    }

    let mut encoded = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut encoded, PrettyFormatter::with_indent(b"    "));
    memory.serialize(&mut serializer)?;

    tokio::fs::write(path, encoded).await?;
    info!("cleared greeting flags in {}", path.display());
    Ok(())
}

fn empty_memory() -> Map<String, Value> {
    let mut memory = Map::new();
    memory.insert("history".to_owned(), json!([]));
    memory
}
