// ============================================================
// Layer 2 — InitConfigUseCase
// ============================================================
// Writes a config file with the default model sizes, so the other
// commands have something to build a model from.

use anyhow::Result;

use crate::infra::config_store::ConfigStore;
use crate::ml::config::{DataConfig, QvHadamardConfig, VqaConfig};

#[derive(Debug, Clone)]
pub struct InitConfig {
    pub out_path:          String,
    pub num_ans:           usize,
    pub vocab_size:        usize,
    pub max_question_len:  usize,
    pub num_hid:           usize,
    pub normalize_regions: bool,
}

pub struct InitConfigUseCase {
    config: InitConfig,
}

impl InitConfigUseCase {
    pub fn new(config: InitConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<VqaConfig> {
        let c = &self.config;
        let cfg = VqaConfig::new(
            DataConfig::new(c.num_ans)
                .with_vocab_size(c.vocab_size)
                .with_max_question_len(c.max_question_len),
            QvHadamardConfig::new()
                .with_num_hid(c.num_hid)
                .with_normalize_regions(c.normalize_regions),
        );

        ConfigStore::new(&c.out_path).save(&cfg)?;
        tracing::info!(
            "Wrote config for {} answers ({} logits) to '{}'",
            cfg.data.num_ans,
            cfg.num_logits(),
            c.out_path
        );
        Ok(cfg)
    }
}
