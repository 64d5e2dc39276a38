// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits, so the
// tokenizer and the model backend can change underneath it.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::{answer::Prediction, vqa_pair::VqaPair};

// ─── QuestionTokenizer ────────────────────────────────────────────────────────
/// Turns question text into vocabulary ids.
///
/// Implementations:
///   - WordTokenizer → HuggingFace WordLevel tokenizer JSON
pub trait QuestionTokenizer {
    /// Ids for the words of `text`, without padding.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;
}

// ─── AnswerPredictor ──────────────────────────────────────────────────────────
/// Anything that can answer a batch of questions about images.
///
/// Implementations:
///   - Inferencer → runs the QvHadamard model on a Burn backend
pub trait AnswerPredictor {
    /// One prediction per pair, in order, each with at most `top_k` answers.
    fn predict(&self, pairs: &[VqaPair], top_k: usize) -> Result<Vec<Prediction>>;
}
