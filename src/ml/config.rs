// ============================================================
// Layer 5 — Model Configuration
// ============================================================
// `VqaConfig` is the single object the model is built from.
// It is split the same way the config file is laid out:
//
//   {
//     "data":  { "num_ans": 3129, "vocab_size": 20000, "max_question_len": 14 },
//     "model": { "q_dim": 300, "v_dim": 2048, "num_hid": 1024,
//                "dropout": 0.5, "normalize_regions": false }
//   }
//
// #[derive(Config)] gives us `new`, `with_*` builders, defaults,
// and serde support in one go.

use anyhow::{ensure, Result};
use burn::prelude::*;

#[derive(Config, Debug)]
pub struct DataConfig {
    /// Number of answer classes, including the held-out class 0.
    /// The classifier emits num_ans - 1 logits.
    pub num_ans: usize,

    /// Rows in the word embedding table when no pretrained table is given
    #[config(default = 20000)]
    pub vocab_size: usize,

    /// Questions longer than this are truncated before batching
    #[config(default = 14)]
    pub max_question_len: usize,
}

#[derive(Config, Debug)]
pub struct QvHadamardConfig {
    /// Word embedding width
    #[config(default = 300)]
    pub q_dim: usize,

    /// Width of one detector region feature
    #[config(default = 2048)]
    pub v_dim: usize,

    /// Hidden size shared by the GRU, projections and classifier
    #[config(default = 1024)]
    pub num_hid: usize,

    #[config(default = 0.5)]
    pub dropout: f64,

    /// L2-normalise projected region vectors before attention
    #[config(default = false)]
    pub normalize_regions: bool,
}

#[derive(Config, Debug)]
pub struct VqaConfig {
    pub data:  DataConfig,
    pub model: QvHadamardConfig,
}

impl VqaConfig {
    /// Width of the classifier output.
    pub fn num_logits(&self) -> usize {
        self.data.num_ans.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.data.num_ans >= 2,
            "data.num_ans must be at least 2 (got {}); class 0 is held out",
            self.data.num_ans
        );
        ensure!(self.data.vocab_size > 0, "data.vocab_size must be positive");
        ensure!(self.data.max_question_len > 0, "data.max_question_len must be positive");
        ensure!(
            self.model.q_dim > 0 && self.model.v_dim > 0 && self.model.num_hid > 0,
            "model dimensions must be positive"
        );
        ensure!(
            (0.0..1.0).contains(&self.model.dropout),
            "model.dropout must be in [0, 1) (got {})",
            self.model.dropout
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_sizes() {
        let cfg = VqaConfig::new(DataConfig::new(3129), QvHadamardConfig::new());
        assert_eq!(cfg.model.q_dim, 300);
        assert_eq!(cfg.model.v_dim, 2048);
        assert_eq!(cfg.model.num_hid, 1024);
        assert_eq!(cfg.num_logits(), 3128);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_single_answer_class_is_rejected() {
        let cfg = VqaConfig::new(DataConfig::new(1), QvHadamardConfig::new());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_dropout_out_of_range_is_rejected() {
        let cfg = VqaConfig::new(DataConfig::new(10), QvHadamardConfig::new().with_dropout(1.0));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_json_uses_nested_layout() {
        let cfg  = VqaConfig::new(DataConfig::new(7), QvHadamardConfig::new());
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["data"]["num_ans"], 7);
        assert_eq!(json["model"]["num_hid"], 1024);
    }
}
