// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Owns a built model on one device and turns VqaPairs into
// Predictions: batch → forward → softmax → top-k.
use anyhow::Result;
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::activation::softmax,
};

use crate::data::batcher::{VqaBatch, VqaBatcher};
use crate::domain::{
    answer::{top_k, AnswerVocab, Prediction},
    traits::AnswerPredictor,
    vqa_pair::VqaPair,
};
use crate::ml::{config::VqaConfig, model::QvHadamard};

pub struct Inferencer<B: Backend> {
    model:       QvHadamard<B>,
    batcher:     VqaBatcher,
    feature_dim: usize,
    vocab_rows:  usize,
    answers:     Option<AnswerVocab>,
    device:      B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: QvHadamard<B>, cfg: &VqaConfig, device: B::Device) -> Self {
        // A pretrained table decides the row count, not cfg.data.vocab_size
        let [vocab_rows, _] = model.encoder.embedding.weight.val().dims();
        Self {
            model,
            batcher:     VqaBatcher::new(cfg.data.max_question_len),
            feature_dim: cfg.model.v_dim,
            vocab_rows,
            answers:     None,
            device,
        }
    }

    /// Attach labels so predictions carry answer text.
    pub fn with_answers(mut self, answers: AnswerVocab) -> Self {
        self.answers = Some(answers);
        self
    }

    fn run(&self, pairs: &[VqaPair], k: usize) -> Result<Vec<Prediction>> {
        self.batcher.check(pairs, self.feature_dim, self.vocab_rows)?;

        let batch = <VqaBatcher as Batcher<B, VqaPair, VqaBatch<B>>>::batch(
            &self.batcher,
            pairs.to_vec(),
            &self.device,
        );

        let output = self.model.forward_with_attention(
            batch.regions,
            batch.spatial,
            batch.tokens,
            batch.lengths,
        );
        let [_, num_logits] = output.logits.dims();
        let [_, num_regions] = output.attention.dims();

        let probs: Vec<f32> = softmax(output.logits, 1)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;
        let attention: Vec<f32> = output.attention
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read attention: {e:?}"))?;

        let predictions: Vec<Prediction> = probs
            .chunks(num_logits)
            .zip(attention.chunks(num_regions))
            .map(|(row, weights)| Prediction {
                answers:   top_k(row, k, self.answers.as_ref()),
                attention: weights.to_vec(),
            })
            .collect();

        tracing::debug!(
            "Answered {} questions over {} regions each",
            predictions.len(),
            num_regions
        );
        Ok(predictions)
    }
}

impl<B: Backend> AnswerPredictor for Inferencer<B> {
    fn predict(&self, pairs: &[VqaPair], top_k: usize) -> Result<Vec<Prediction>> {
        self.run(pairs, top_k)
    }
}
