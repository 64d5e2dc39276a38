// ============================================================
// Layer 3 — Question Domain Type
// ============================================================

use serde::{Deserialize, Serialize};

/// A question as token ids. Padding is added later by the batcher,
/// so `token_ids` only ever holds real tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Original text, kept for display
    pub text: Option<String>,

    pub token_ids: Vec<u32>,
}

impl Question {
    pub fn new(token_ids: Vec<u32>) -> Self {
        Self { text: None, token_ids }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// True length, before any padding or truncation
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }

    /// The first `max_len` tokens
    pub fn truncated(&self, max_len: usize) -> &[u32] {
        &self.token_ids[..self.len().min(max_len)]
    }
}
