// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Builds a model from a config file and reports on it:
//
//   Step 1: Load model config                 (Layer 6 - infra)
//   Step 2: Build model, count parameters     (Layer 5 - ml)
//   Step 3: Optional smoke batch of synthetic
//           pairs through forward_with_attention,
//           checking output shape and that every
//           attention row sums to 1           (Layer 4 - data)

use anyhow::{ensure, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::{
    batcher::{VqaBatch, VqaBatcher},
    synthetic::{synthetic_pairs, SyntheticSpec},
};
use crate::domain::vqa_pair::VqaPair;
use crate::infra::config_store::ConfigStore;
use crate::ml::model::QvHadamard;

/// Largest allowed distance of an attention row sum from 1.
const ATTENTION_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub config_path: String,
    /// Pairs in the smoke batch; 0 skips it
    pub smoke_batch: usize,
    pub num_regions: usize,
    pub seed:        u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSize {
    pub name:   &'static str,
    pub params: usize,
}

#[derive(Debug, Clone)]
pub struct SmokeCheck {
    pub batch_size:     usize,
    pub num_regions:    usize,
    pub logits_shape:   [usize; 2],
    /// max |sum(attention row) - 1| over the batch
    pub attention_error: f32,
}

#[derive(Debug, Clone)]
pub struct InspectReport {
    pub components:   Vec<ComponentSize>,
    pub total_params: usize,
    pub smoke:        Option<SmokeCheck>,
}

pub struct InspectUseCase {
    config: InspectConfig,
}

impl InspectUseCase {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<InspectReport> {
        let c = &self.config;

        // ── Step 1: Config ────────────────────────────────────────────────────
        let cfg = ConfigStore::new(&c.config_path).load()?;

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let model = QvHadamard::<B>::new(&cfg, None, &device);

        let components = vec![
            ComponentSize { name: "encoder",    params: model.encoder.num_params() },
            ComponentSize { name: "attention",  params: model.attention.num_params() },
            ComponentSize { name: "pre_q_proj", params: model.pre_q_proj.num_params() },
            ComponentSize { name: "pre_v_proj", params: model.pre_v_proj.num_params() },
            ComponentSize { name: "q_proj",     params: model.q_proj.num_params() },
            ComponentSize { name: "v_proj",     params: model.v_proj.num_params() },
            ComponentSize { name: "classifier", params: model.classifier.num_params() },
        ];
        for part in &components {
            tracing::info!("{:<12} {:>12} parameters", part.name, part.params);
        }
        let total_params = model.num_params();
        tracing::info!("{:<12} {:>12} parameters", "total", total_params);

        // ── Step 3: Smoke batch ───────────────────────────────────────────────
        if c.smoke_batch == 0 {
            return Ok(InspectReport { components, total_params, smoke: None });
        }
        ensure!(c.num_regions > 0, "the smoke batch needs at least one region");

        let pairs = synthetic_pairs(&SyntheticSpec {
            count:       c.smoke_batch,
            num_regions: c.num_regions,
            feature_dim: cfg.model.v_dim,
            vocab_size:  cfg.data.vocab_size,
            max_len:     cfg.data.max_question_len,
            seed:        c.seed,
        });

        let batcher = VqaBatcher::new(cfg.data.max_question_len);
        let [vocab_rows, _] = model.encoder.embedding.weight.val().dims();
        batcher.check(&pairs, cfg.model.v_dim, vocab_rows)?;
        let batch = <VqaBatcher as Batcher<B, VqaPair, VqaBatch<B>>>::batch(&batcher, pairs, &device);

        let output = model.forward_with_attention(batch.regions, batch.spatial, batch.tokens, batch.lengths);
        let logits_shape = output.logits.dims();
        ensure!(
            logits_shape == [c.smoke_batch, cfg.num_logits()],
            "logits have shape {:?}, expected [{}, {}]",
            logits_shape,
            c.smoke_batch,
            cfg.num_logits()
        );

        let sums: Vec<f32> = output.attention
            .sum_dim(1)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read attention sums: {e:?}"))?;
        let attention_error = sums.iter().map(|s| (s - 1.0).abs()).fold(0.0f32, f32::max);
        ensure!(
            attention_error <= ATTENTION_TOLERANCE,
            "attention rows do not sum to 1 (worst error {attention_error})"
        );

        tracing::info!(
            "Smoke batch ok: logits {:?}, attention error {:.2e}",
            logits_shape,
            attention_error
        );

        Ok(InspectReport {
            components,
            total_params,
            smoke: Some(SmokeCheck {
                batch_size: c.smoke_batch,
                num_regions: c.num_regions,
                logits_shape,
                attention_error,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::config::{DataConfig, QvHadamardConfig, VqaConfig};
    use burn::backend::NdArray;

    fn write_config(name: &str) -> String {
        let path = std::env::temp_dir()
            .join(format!("qv_hadamard_inspect_{}", std::process::id()))
            .join(name);
        let cfg = VqaConfig::new(
            DataConfig::new(7).with_vocab_size(30).with_max_question_len(6),
            QvHadamardConfig::new().with_q_dim(4).with_v_dim(10).with_num_hid(8),
        );
        ConfigStore::new(&path).save(&cfg).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn inspect(name: &str, smoke_batch: usize) -> InspectReport {
        InspectUseCase::new(InspectConfig {
            config_path: write_config(name),
            smoke_batch,
            num_regions: 4,
            seed:        11,
        })
        .execute::<NdArray>(Default::default())
        .unwrap()
    }

    #[test]
    fn test_component_counts_add_up() {
        let report = inspect("counts.json", 0);
        let sum: usize = report.components.iter().map(|c| c.params).sum();

        assert_eq!(sum, report.total_params);
        assert!(report.smoke.is_none());

        // Linear(8 → 6) + ReluNet(8 → 8) with biases
        let classifier = report.components.iter().find(|c| c.name == "classifier").unwrap();
        assert_eq!(classifier.params, (8 * 8 + 8) + (8 * 6 + 6));
    }

    #[test]
    fn test_smoke_batch_passes() {
        let smoke = inspect("smoke.json", 3).smoke.unwrap();
        assert_eq!(smoke.logits_shape, [3, 6]);
        assert_eq!(smoke.num_regions, 4);
        assert!(smoke.attention_error <= ATTENTION_TOLERANCE);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let result = InspectUseCase::new(InspectConfig {
            config_path: "/nonexistent/qv_hadamard/config.json".into(),
            smoke_batch: 1,
            num_regions: 2,
            seed:        0,
        })
        .execute::<NdArray>(Default::default());
        assert!(result.is_err());
    }
}
