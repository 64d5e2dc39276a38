// ============================================================
// Layer 6 — JSON Inputs
// ============================================================
// Requests file: a JSON array of VqaRequest objects
//   [ { "question": "what is on the plate?",
//       "regions":  [[...], ...],
//       "spatial":  [[...], ...] } ]
//
// Answers file: a JSON array of labels, position = answer id
//   [ "<unk>", "yes", "no", "2", ... ]

use anyhow::{ensure, Context, Result};
use std::{fs, path::Path};

use crate::domain::{answer::AnswerVocab, vqa_pair::VqaRequest};

pub fn load_requests(path: impl AsRef<Path>) -> Result<Vec<VqaRequest>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read requests from '{}'", path.display()))?;

    let requests: Vec<VqaRequest> = serde_json::from_str(&json)
        .with_context(|| format!("Malformed requests file '{}'", path.display()))?;
    ensure!(!requests.is_empty(), "'{}' contains no requests", path.display());

    tracing::debug!("Read {} requests from '{}'", requests.len(), path.display());
    Ok(requests)
}

pub fn load_answer_vocab(path: impl AsRef<Path>) -> Result<AnswerVocab> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read answers from '{}'", path.display()))?;

    let labels: Vec<String> = serde_json::from_str(&json)
        .with_context(|| format!("Answers file '{}' must be a JSON array of strings", path.display()))?;

    Ok(AnswerVocab::new(labels))
}
