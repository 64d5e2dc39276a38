// ============================================================
// Layer 4 — VQA Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<VqaPair> into the
// four tensors the model's forward pass takes.
//
// How batching works here:
//   Input:  N pairs, each with a question of any length and
//           K regions of width V (K is the same for every pair)
//   Output: VqaBatch with
//             regions [N, K, V]
//             spatial [N, K, S]
//             tokens  [N, T]   zero-padded, T = longest question
//                              (capped at max_question_len)
//             lengths [N]      true length after truncation
//
// Questions vary in length, so padding happens here rather than
// upstream. Region counts must already agree; `check` reports
// anything the tensors could not represent.
//
// Reference: Burn Book §4 (Batcher)

use anyhow::{bail, ensure, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::vqa_pair::VqaPair;
use crate::ml::encoder::PAD_ID;

// ─── VqaBatch ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct VqaBatch<B: Backend> {
    /// Region features — shape: [batch, regions, v_dim]
    pub regions: Tensor<B, 3>,

    /// Region geometry — shape: [batch, regions, spatial_dim]
    pub spatial: Tensor<B, 3>,

    /// Padded token ids — shape: [batch, seq_len]
    pub tokens: Tensor<B, 2, Int>,

    /// Real question lengths — shape: [batch]
    pub lengths: Tensor<B, 1, Int>,
}

// ─── VqaBatcher ───────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct VqaBatcher {
    pub max_question_len: usize,
}

/// Host-side token layout of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedQuestions {
    /// Row-major [batch, seq_len]
    pub ids:     Vec<i32>,
    pub lengths: Vec<i32>,
    pub seq_len: usize,
}

impl VqaBatcher {
    pub fn new(max_question_len: usize) -> Self {
        Self { max_question_len }
    }

    /// Validate a batch before handing it to `batch`. `vocab_rows` is the
    /// number of rows in the word embedding table; every token id must
    /// index one of them.
    pub fn check(&self, pairs: &[VqaPair], feature_dim: usize, vocab_rows: usize) -> Result<()> {
        ensure!(!pairs.is_empty(), "cannot build an empty batch");

        let regions = pairs[0].regions.num_regions();
        let spatial = pairs[0].regions.spatial_dim();
        for (i, pair) in pairs.iter().enumerate() {
            pair.regions
                .validate(feature_dim)
                .map_err(|e| e.context(format!("pair {i}")))?;
            ensure!(
                pair.regions.num_regions() == regions,
                "pair {i} has {} regions but pair 0 has {regions}; \
                 a batch needs one region count",
                pair.regions.num_regions()
            );
            ensure!(
                pair.regions.spatial_dim() == spatial,
                "pair {i} has spatial width {} but pair 0 has {spatial}",
                pair.regions.spatial_dim()
            );
            ensure!(!pair.question.is_empty(), "pair {i} has an empty question");
            if let Some(&id) = pair.question.token_ids.iter().find(|&&id| id as usize >= vocab_rows) {
                bail!("pair {i} uses token id {id}, but the embedding table has {vocab_rows} rows");
            }
        }
        Ok(())
    }

    /// Truncate every question to `max_question_len` and zero-pad to the
    /// longest remaining one.
    pub fn pad_questions(&self, pairs: &[VqaPair]) -> PaddedQuestions {
        let truncated: Vec<&[u32]> = pairs
            .iter()
            .map(|p| p.question.truncated(self.max_question_len))
            .collect();

        // At least one column so an all-empty batch still has a shape
        let seq_len = truncated.iter().map(|t| t.len()).max().unwrap_or(0).max(1);

        let mut ids = Vec::with_capacity(pairs.len() * seq_len);
        for tokens in &truncated {
            ids.extend(tokens.iter().map(|&t| t as i32));
            ids.extend(std::iter::repeat(PAD_ID).take(seq_len - tokens.len()));
        }
        let lengths = truncated.iter().map(|t| t.len() as i32).collect();

        PaddedQuestions { ids, lengths, seq_len }
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<B, VqaPair, VqaBatch<B>> for VqaBatcher {
    fn batch(&self, items: Vec<VqaPair>, device: &B::Device) -> VqaBatch<B> {
        let batch_size  = items.len();
        let num_regions = items[0].regions.num_regions();
        let feature_dim = items[0].regions.features.first().map_or(0, Vec::len);
        let spatial_dim = items[0].regions.spatial_dim();

        // ── Flatten region features and geometry ──────────────────────────────
        let region_flat: Vec<f32> = items
            .iter()
            .flat_map(|p| p.regions.features.iter().flatten().copied())
            .collect();
        let spatial_flat: Vec<f32> = items
            .iter()
            .flat_map(|p| p.regions.spatial_or_zeros().into_iter().flatten())
            .collect();

        let padded = self.pad_questions(&items);

        // ── Create tensors ────────────────────────────────────────────────────
        let regions = Tensor::<B, 1>::from_floats(region_flat.as_slice(), device)
            .reshape([batch_size, num_regions, feature_dim]);

        let spatial = Tensor::<B, 1>::from_floats(spatial_flat.as_slice(), device)
            .reshape([batch_size, num_regions, spatial_dim]);

        let tokens = Tensor::<B, 1, Int>::from_ints(padded.ids.as_slice(), device)
            .reshape([batch_size, padded.seq_len]);

        let lengths = Tensor::<B, 1, Int>::from_ints(padded.lengths.as_slice(), device);

        VqaBatch { regions, spatial, tokens, lengths }
    }
}
