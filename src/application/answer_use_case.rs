// ============================================================
// Layer 2 — AnswerUseCase
// ============================================================
// Orchestrates one answering run:
//
//   Step 1: Load model config            (Layer 6 - infra)
//   Step 2: Load pretrained embeddings   (Layer 6 - infra, optional)
//   Step 3: Load / build tokenizer       (Layer 6 - infra, optional)
//   Step 4: Turn requests into VqaPairs  (Layer 3 - domain)
//   Step 5: Build model + inferencer     (Layer 5 - ml)
//   Step 6: Predict, grouped by region count so every batch
//           has one tensor shape          (Layer 5 - ml)

use anyhow::{bail, ensure, Context, Result};
use burn::prelude::*;
use std::collections::BTreeMap;

use crate::domain::{
    answer::Prediction,
    question::Question,
    traits::{AnswerPredictor, QuestionTokenizer},
    vqa_pair::{VqaPair, VqaRequest},
};
use crate::infra::{
    config_store::ConfigStore,
    embeddings::PretrainedEmbeddings,
    json_files::{load_answer_vocab, load_requests},
    tokenizer_store::{TokenizerStore, WordTokenizer},
};
use crate::ml::{inferencer::Inferencer, model::QvHadamard};

#[derive(Debug, Clone)]
pub struct AnswerConfig {
    pub config_path:      String,
    pub requests_path:    String,
    pub tokenizer_path:   Option<String>,
    pub embeddings_path:  Option<String>,
    pub embeddings_limit: Option<usize>,
    pub answers_path:     Option<String>,
    pub top_k:            usize,
    pub batch_size:       usize,
}

/// One request's outcome, in the order the requests were given.
#[derive(Debug, Clone)]
pub struct AnsweredRequest {
    pub question:   Option<String>,
    pub prediction: Prediction,
}

pub struct AnswerUseCase {
    config: AnswerConfig,
}

impl AnswerUseCase {
    pub fn new(config: AnswerConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<Vec<AnsweredRequest>> {
        let c = &self.config;
        ensure!(c.top_k > 0, "top_k must be at least 1");
        ensure!(c.batch_size > 0, "batch_size must be at least 1");

        // ── Step 1: Model config ──────────────────────────────────────────────
        let cfg = ConfigStore::new(&c.config_path).load()?;

        // ── Step 2: Pretrained embeddings ─────────────────────────────────────
        let embeddings = c.embeddings_path
            .as_ref()
            .map(|p| PretrainedEmbeddings::load(p, cfg.model.q_dim, c.embeddings_limit))
            .transpose()?;

        // ── Step 3: Tokenizer ─────────────────────────────────────────────────
        let tokenizer = self.tokenizer(embeddings.as_ref())?;

        // ── Step 4: Requests → pairs ──────────────────────────────────────────
        let requests = load_requests(&c.requests_path)?;
        tracing::info!("Answering {} requests", requests.len());

        let pairs: Vec<VqaPair> = requests
            .into_iter()
            .enumerate()
            .map(|(i, r)| to_pair(i, r, tokenizer.as_ref().map(|t| t as &dyn QuestionTokenizer)))
            .collect::<Result<_>>()?;

        // ── Step 5: Model ─────────────────────────────────────────────────────
        let pre_emb = embeddings.as_ref().map(|e| e.to_tensor::<B>(&device));
        let model   = QvHadamard::<B>::new(&cfg, pre_emb, &device);
        tracing::info!("Model ready: {} parameters", model.num_params());

        let mut inferencer = Inferencer::new(model, &cfg, device);
        if let Some(path) = &c.answers_path {
            let answers = load_answer_vocab(path)?;
            if answers.len() != cfg.data.num_ans {
                tracing::warn!(
                    "Answer file has {} labels but the model has {} classes",
                    answers.len(),
                    cfg.data.num_ans
                );
            }
            inferencer = inferencer.with_answers(answers);
        }

        // ── Step 6: Predict ───────────────────────────────────────────────────
        let predictions = predict_grouped(&inferencer, &pairs, c.batch_size, c.top_k)?;

        Ok(pairs
            .into_iter()
            .zip(predictions)
            .map(|(pair, prediction)| AnsweredRequest {
                question: pair.question.text,
                prediction,
            })
            .collect())
    }

    fn tokenizer(&self, embeddings: Option<&PretrainedEmbeddings>) -> Result<Option<WordTokenizer>> {
        let Some(path) = &self.config.tokenizer_path else {
            return Ok(None);
        };
        let store = TokenizerStore::new(path);
        let Some(e) = embeddings else {
            return Ok(Some(store.load()?));
        };

        let tokenizer = store.load_or_build(e.words())?;
        tokenizer.check_aligned(e.words()).with_context(|| {
            format!(
                "Tokenizer '{}' does not match embeddings '{}'; \
                 delete the tokenizer to rebuild it from the embeddings",
                path,
                self.config.embeddings_path.as_deref().unwrap_or("?")
            )
        })?;
        Ok(Some(tokenizer))
    }
}

fn to_pair(index: usize, request: VqaRequest, tokenizer: Option<&dyn QuestionTokenizer>) -> Result<VqaPair> {
    let token_ids = match (request.token_ids, &request.question, tokenizer) {
        (Some(ids), _, _)                 => ids,
        (None, Some(text), Some(tok))     => tok.encode(text)?,
        (None, Some(_), None)             => bail!("request {index} has question text but no tokenizer was given"),
        (None, None, _)                   => bail!("request {index} has neither 'question' nor 'token_ids'"),
    };
    ensure!(!token_ids.is_empty(), "request {index} tokenised to nothing");

    let mut question = Question::new(token_ids);
    if let Some(text) = request.question {
        question = question.with_text(text);
    }
    Ok(VqaPair::new(question, request.regions))
}

/// Batch pairs that share a region layout, then restore request order.
fn predict_grouped(
    predictor:  &dyn AnswerPredictor,
    pairs:      &[VqaPair],
    batch_size: usize,
    top_k:      usize,
) -> Result<Vec<Prediction>> {
    let mut groups: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (i, pair) in pairs.iter().enumerate() {
        let key = (pair.regions.num_regions(), pair.regions.spatial_dim());
        groups.entry(key).or_default().push(i);
    }

    let mut slots: Vec<Option<Prediction>> = vec![None; pairs.len()];
    for ((regions, _), indices) in &groups {
        for chunk in indices.chunks(batch_size) {
            let batch: Vec<VqaPair> = chunk.iter().map(|&i| pairs[i].clone()).collect();
            tracing::debug!("Batch of {} pairs with {} regions", batch.len(), regions);

            for (&i, prediction) in chunk.iter().zip(predictor.predict(&batch, top_k)?) {
                slots[i] = Some(prediction);
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, p)| p.ok_or_else(|| anyhow::anyhow!("no prediction produced for request {i}")))
        .collect()
}
