//! Per-conversation state that outlives a single turn.

use indexmap::IndexMap;

/// What the brain remembers about the person it is talking to.
///
/// Interpretations are thrown away at the end of every turn; the session
/// is the only thing intents may write to that survives into the next.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Name the user introduced themselves with.
    pub user_name: Option<String>,
    facts: IndexMap<String, String>,
    turns: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.facts.insert(key.into(), value.into());
    }

    pub fn recall(&self, key: &str) -> Option<&str> {
        self.facts.get(key).map(String::as_str)
    }

    pub fn forget(&mut self, key: &str) -> Option<String> {
        self.facts.shift_remove(key)
    }

    /// Facts in the order they were first remembered.
    pub fn facts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Turns started so far.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    pub(crate) fn begin_turn(&mut self) -> u64 {
        self.turns += 1;
        self.turns
    }
}
