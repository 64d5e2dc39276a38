// ============================================================
// Layer 3 — Answers
// ============================================================
// The classifier scores every answer except id 0, which is the
// held-out class (typically "no confident answer"). Logit i
// therefore belongs to answer id i + 1.

use serde::{Deserialize, Serialize};

/// Answer id the model never scores.
pub const HELD_OUT_ANSWER_ID: usize = 0;

/// Map a classifier output column to its answer id.
pub fn answer_id_for_logit(index: usize) -> usize {
    index + 1
}

/// Ordered answer labels; position = answer id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerVocab {
    labels: Vec<String>,
}

impl AnswerVocab {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn label(&self, answer_id: usize) -> Option<&str> {
        self.labels.get(answer_id).map(String::as_str)
    }

    /// Total classes, held-out class included
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAnswer {
    pub answer_id:   usize,
    pub label:       Option<String>,
    pub probability: f32,
}

/// Everything the model says about one question.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Best answers first
    pub answers:   Vec<ScoredAnswer>,
    /// Attention weight per region, in input order
    pub attention: Vec<f32>,
}

impl Prediction {
    pub fn best(&self) -> Option<&ScoredAnswer> {
        self.answers.first()
    }
}

/// The `k` most probable answers from one row of class probabilities.
pub fn top_k(probabilities: &[f32], k: usize, vocab: Option<&AnswerVocab>) -> Vec<ScoredAnswer> {
    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(k)
        .map(|(index, probability)| {
            let answer_id = answer_id_for_logit(index);
            ScoredAnswer {
                answer_id,
                label: vocab.and_then(|v| v.label(answer_id)).map(str::to_string),
                probability,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_orders_by_probability() {
        let answers = top_k(&[0.1, 0.6, 0.3], 2, None);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].answer_id, 2);
        assert_eq!(answers[1].answer_id, 3);
        assert!(answers[0].probability >= answers[1].probability);
    }

    #[test]
    fn test_top_k_skips_held_out_label() {
        let vocab = AnswerVocab::new(vec!["<unk>".into(), "yes".into(), "no".into()]);
        let answers = top_k(&[0.8, 0.2], 5, Some(&vocab));

        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].label.as_deref(), Some("yes"));
        assert_eq!(answers[1].label.as_deref(), Some("no"));
        assert!(answers.iter().all(|a| a.answer_id != HELD_OUT_ANSWER_ID));
    }

    #[test]
    fn test_label_out_of_range() {
        let vocab = AnswerVocab::new(vec!["<unk>".into()]);
        assert_eq!(vocab.label(3), None);
        let answers = top_k(&[1.0], 1, Some(&vocab));
        assert_eq!(answers[0].label, None);
    }
}
