// ============================================================
// Layer 5 — QvHadamard Model
// ============================================================
// Question and image regions are fused through Hadamard
// attention, then classified into answer logits:
//
//   tokens ──► QuestionEncoder ──► pre_q_proj ──┬──────────────► q_proj ─┐
//                                               │                        ⊙ ──► classifier ──► logits
//   regions ─► pre_v_proj ─► [l2] ─► attention ─┴─► weighted sum ► v_proj ┘
//
// Logit i belongs to answer id i + 1. Answer id 0 is held out and
// handled by the caller, so there are num_ans - 1 logits.
//
// Reference: Teney et al. (2017) Tips and Tricks for VQA
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
};

use crate::ml::attention::{attend, attention_weights, HadamardAttention, HadamardAttentionConfig};
use crate::ml::config::VqaConfig;
use crate::ml::encoder::{QuestionEncoder, QuestionEncoderConfig};
use crate::ml::relu_net::{ReluNet, ReluNetConfig};

const L2_EPSILON: f32 = 1e-12;

#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub hidden:  ReluNet<B>,
    pub dropout: Dropout,
    pub output:  Linear<B>,
}

impl<B: Backend> Classifier<B> {
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.hidden.forward(x);
        let x = self.dropout.forward(x);
        self.output.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct QvHadamard<B: Backend> {
    pub encoder:           QuestionEncoder<B>,
    pub attention:         HadamardAttention<B>,
    pub pre_q_proj:        ReluNet<B>,
    pub pre_v_proj:        ReluNet<B>,
    pub q_proj:            ReluNet<B>,
    pub v_proj:            ReluNet<B>,
    pub classifier:        Classifier<B>,
    pub normalize_regions: bool,
}

/// Logits plus the post-softmax attention the model used to get them.
pub struct VqaOutput<B: Backend> {
    /// [batch, num_ans - 1]
    pub logits:    Tensor<B, 2>,
    /// [batch, regions], each row sums to 1
    pub attention: Tensor<B, 2>,
}

impl<B: Backend> QvHadamard<B> {
    /// Build the model from `conf`. When `pre_emb` is given it becomes the
    /// word embedding table ([vocab, q_dim]); otherwise a table of
    /// `conf.data.vocab_size` rows is initialised randomly.
    pub fn new(conf: &VqaConfig, pre_emb: Option<Tensor<B, 2>>, device: &B::Device) -> Self {
        let m   = &conf.model;
        let hid = m.num_hid;

        let encoder_cfg = QuestionEncoderConfig::new(conf.data.vocab_size, m.q_dim, hid);
        let encoder = match pre_emb {
            Some(table) => encoder_cfg.init_with_embeddings(table, device),
            None        => encoder_cfg.init(device),
        };

        let classifier = Classifier {
            hidden:  ReluNetConfig::new(hid, hid).init(device),
            dropout: DropoutConfig::new(m.dropout).init(),
            output:  LinearConfig::new(hid, conf.num_logits()).init(device),
        };

        Self {
            encoder,
            // q and v are both pre-projected to num_hid before scoring
            attention:  HadamardAttentionConfig::new(hid, hid, hid).init(device),
            pre_q_proj: ReluNetConfig::new(2 * hid, hid).init(device),
            pre_v_proj: ReluNetConfig::new(m.v_dim, hid).init(device),
            q_proj:     ReluNetConfig::new(hid, hid).init(device),
            v_proj:     ReluNetConfig::new(hid, hid).init(device),
            classifier,
            normalize_regions: m.normalize_regions,
        }
    }

    /// regions: [batch, regions, v_dim], spatial: [batch, regions, S] (unused),
    /// tokens: [batch, seq_len], lengths: [batch] → logits [batch, num_ans - 1]
    pub fn forward(
        &self,
        regions: Tensor<B, 3>,
        spatial: Tensor<B, 3>,
        tokens:  Tensor<B, 2, Int>,
        lengths: Tensor<B, 1, Int>,
    ) -> Tensor<B, 2> {
        self.forward_with_attention(regions, spatial, tokens, lengths).logits
    }

    pub fn forward_with_attention(
        &self,
        regions:  Tensor<B, 3>,
        _spatial: Tensor<B, 3>,
        tokens:   Tensor<B, 2, Int>,
        lengths:  Tensor<B, 1, Int>,
    ) -> VqaOutput<B> {
        let question = self.encoder.forward(tokens, lengths);
        let question = self.pre_q_proj.forward(question);

        let mut regions = self.pre_v_proj.forward(regions);
        if self.normalize_regions {
            regions = l2_normalize(regions);
        }

        let attention = self.attention_scores(regions.clone(), question.clone());
        let attended  = attend(attention.clone(), regions);

        let fused  = self.q_proj.forward(question) * self.v_proj.forward(attended);
        let logits = self.classifier.forward(fused);

        VqaOutput { logits, attention }
    }

    /// Softmax-normalised attention over regions.
    /// regions: [batch, regions, num_hid], question: [batch, num_hid] → [batch, regions]
    pub fn attention_scores(&self, regions: Tensor<B, 3>, question: Tensor<B, 2>) -> Tensor<B, 2> {
        attention_weights(self.attention.score_regions(question, regions))
    }
}

/// Scale every vector along the last axis to unit length.
fn l2_normalize<B: Backend>(x: Tensor<B, 3>) -> Tensor<B, 3> {
    let [_, _, width] = x.dims();
    let norm = x
        .clone()
        .powf_scalar(2.0)
        .sum_dim(2)
        .sqrt()
        .clamp_min(L2_EPSILON)
        .repeat_dim(2, width);
    x / norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::config::{DataConfig, QvHadamardConfig};
    use burn::backend::NdArray;
    use burn::tensor::Distribution;
    use float_cmp::approx_eq;

    type TestBackend = NdArray;

    fn small_config(num_ans: usize) -> VqaConfig {
        VqaConfig::new(
            DataConfig::new(num_ans).with_vocab_size(30),
            QvHadamardConfig::new()
                .with_q_dim(6)
                .with_v_dim(10)
                .with_num_hid(8)
                .with_dropout(0.0),
        )
    }

    struct Inputs {
        regions: Tensor<TestBackend, 3>,
        spatial: Tensor<TestBackend, 3>,
        tokens:  Tensor<TestBackend, 2, Int>,
        lengths: Tensor<TestBackend, 1, Int>,
    }

    fn inputs(batch: usize, regions: usize, device: &<TestBackend as Backend>::Device) -> Inputs {
        let ids: Vec<i32> = (0..batch * 4).map(|i| (i % 29 + 1) as i32).collect();
        Inputs {
            regions: Tensor::random([batch, regions, 10], Distribution::Uniform(0.0, 1.0), device),
            spatial: Tensor::zeros([batch, regions, 6], device),
            tokens:  Tensor::<TestBackend, 1, Int>::from_ints(ids.as_slice(), device).reshape([batch, 4]),
            lengths: Tensor::<TestBackend, 1, Int>::from_ints(vec![4i32; batch].as_slice(), device),
        }
    }

    #[test]
    fn test_logits_drop_held_out_class() {
        let device = Default::default();
        let model  = QvHadamard::<TestBackend>::new(&small_config(5), None, &device);
        let x      = inputs(3, 7, &device);

        let logits = model.forward(x.regions, x.spatial, x.tokens, x.lengths);
        assert_eq!(logits.dims(), [3, 4]);
    }

    #[test]
    fn test_attention_rows_sum_to_one() {
        let device = Default::default();
        let model  = QvHadamard::<TestBackend>::new(&small_config(5), None, &device);
        let x      = inputs(2, 6, &device);

        let out = model.forward_with_attention(x.regions, x.spatial, x.tokens, x.lengths);
        assert_eq!(out.attention.dims(), [2, 6]);

        let sums: Vec<f32> = out.attention.sum_dim(1).into_data().to_vec::<f32>().unwrap();
        for s in sums {
            assert!(approx_eq!(f32, s, 1.0, epsilon = 1e-5));
        }
    }

    #[test]
    fn test_single_region_attention_is_one() {
        let device = Default::default();
        let model  = QvHadamard::<TestBackend>::new(&small_config(3), None, &device);
        let x      = inputs(2, 1, &device);

        let out = model.forward_with_attention(x.regions, x.spatial, x.tokens, x.lengths);
        let weights: Vec<f32> = out.attention.into_data().to_vec::<f32>().unwrap();
        assert_eq!(weights, vec![1.0, 1.0]);
    }

    #[test]
    fn test_region_order_does_not_change_logits() {
        let device = Default::default();
        let model  = QvHadamard::<TestBackend>::new(&small_config(4), None, &device);
        let x      = inputs(1, 5, &device);

        let order    = Tensor::<TestBackend, 1, Int>::from_ints([4, 2, 0, 3, 1], &device);
        let shuffled = x.regions.clone().select(1, order.clone());
        let spatial  = x.spatial.clone().select(1, order);

        let a: Vec<f32> = model
            .forward(x.regions, x.spatial, x.tokens.clone(), x.lengths.clone())
            .into_data().to_vec::<f32>().unwrap();
        let b: Vec<f32> = model
            .forward(shuffled, spatial, x.tokens, x.lengths)
            .into_data().to_vec::<f32>().unwrap();
        for (p, q) in a.iter().zip(b.iter()) {
            assert!(approx_eq!(f32, *p, *q, epsilon = 1e-4));
        }
    }

    #[test]
    fn test_normalized_regions_keep_shapes() {
        let device = Default::default();
        let mut cfg = small_config(6);
        cfg.model.normalize_regions = true;
        let model = QvHadamard::<TestBackend>::new(&cfg, None, &device);
        let x     = inputs(2, 3, &device);

        let out = model.forward_with_attention(x.regions, x.spatial, x.tokens, x.lengths);
        assert_eq!(out.logits.dims(), [2, 5]);
        assert_eq!(out.attention.dims(), [2, 3]);
    }

    #[test]
    fn test_l2_normalize_gives_unit_rows() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 3>::from_floats([[[3.0, 4.0], [0.0, 0.0]]], &device);

        let y: Vec<f32> = l2_normalize(x).into_data().to_vec::<f32>().unwrap();
        assert!(approx_eq!(f32, y[0], 0.6, epsilon = 1e-6));
        assert!(approx_eq!(f32, y[1], 0.8, epsilon = 1e-6));
        assert_eq!(&y[2..], &[0.0, 0.0]);
    }

    #[test]
    fn test_pretrained_embeddings_set_vocab() {
        let device = Default::default();
        let table  = Tensor::<TestBackend, 2>::random([12, 6], Distribution::Normal(0.0, 1.0), &device);
        let model  = QvHadamard::<TestBackend>::new(&small_config(5), Some(table), &device);

        assert_eq!(model.encoder.embedding.weight.val().dims(), [12, 6]);
    }
}
