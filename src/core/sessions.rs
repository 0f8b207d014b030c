//! In-memory conversation windows for the remote chat flow.

use crate::core::traits::SessionStore;
use di::{inject, injectable};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Turns kept per session.
pub const MAX_TURNS: usize = 20;

/// Turns surfaced in a prompt context.
pub const CONTEXT_TURNS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used in prompt contexts.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Kouri",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Process-lifetime session map. Nothing is persisted or evicted.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<BTreeMap<String, VecDeque<Turn>>>,
}

#[injectable(SessionStore)]
impl InMemorySessionStore {
    #[inject]
    pub fn create() -> InMemorySessionStore {
        InMemorySessionStore::default()
    }
}

impl InMemorySessionStore {
    fn sessions(&self) -> MutexGuard<'_, BTreeMap<String, VecDeque<Turn>>> {
        // a panicking holder cannot leave a session half-written
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn turns(&self, session_id: &str) -> Vec<Turn> {
        self.sessions()
            .get(session_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn append_turn(&self, session_id: &str, role: Role, text: &str) {
        let mut sessions = self.sessions();
        let turns = sessions.entry(session_id.to_owned()).or_default();
        turns.push_back(Turn {
            role,
            text: text.to_owned(),
        });
        while turns.len() > MAX_TURNS {
            turns.pop_front();
        }
    }

    fn build_context(&self, session_id: &str) -> String {
        let sessions = self.sessions();
        let Some(turns) = sessions.get(session_id) else {
            return String::new();
        };

        turns
            .iter()
            .skip(turns.len().saturating_sub(CONTEXT_TURNS))
            .map(|turn| format!("{}: {}", turn.role.label(), turn.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn list_sessions(&self) -> Vec<(String, usize)> {
        self.sessions()
            .iter()
            .map(|(id, turns)| (id.clone(), turns.len()))
            .collect()
    }

    fn reset(&self, session_id: &str) {
        self.sessions().remove(session_id);
    }
}
