//! In-memory chat history with role-prefixed lines.

use std::collections::VecDeque;

pub const USER_PREFIX: &str = "Du";
pub const ASSISTANT_PREFIX: &str = "Assistent";

/// Ordered, append-only log of exchanged lines.
///
/// A bounded history keeps only the most recent `limit` entries.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    lines: VecDeque<String>,
    limit: Option<usize>,
}

impl ChatHistory {
    pub fn unbounded() -> Self {
        Self {
            lines: VecDeque::new(),
            limit: None,
        }
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(limit),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn push_user(&mut self, text: &str) {
        self.push(format!("{}: {}", USER_PREFIX, text));
    }

    pub fn push_assistant(&mut self, text: &str) {
        self.push(format!("{}: {}", ASSISTANT_PREFIX, text));
    }

    fn push(&mut self, line: String) {
        if self.limit == Some(0) {
            return;
        }
        self.lines.push_back(line);
        if let Some(limit) = self.limit {
            while self.lines.len() > limit {
                self.lines.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    /// Owned copy handed to a worker
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}
