// ============================================================
// Layer 5 — Hadamard Attention
// ============================================================
// Scores every image region against the question:
//
//   score_k = w · ( relu(Wq q) ⊙ relu(Wv v_k) ) + b
//
// The scorer returns raw scores. Normalisation (softmax over the
// region axis) and pooling live in the free functions below so the
// caller decides when to apply them.
//
// Reference: Teney et al. (2017) Tips and Tricks for VQA
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::softmax,
};

use crate::ml::relu_net::{ReluNet, ReluNetConfig};

#[derive(Config, Debug)]
pub struct HadamardAttentionConfig {
    /// Width of the question vector fed to the scorer
    pub q_dim:       usize,
    /// Width of each region vector fed to the scorer
    pub v_dim:       usize,
    /// Shared space the two branches are projected into
    pub hidden_size: usize,
}

impl HadamardAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> HadamardAttention<B> {
        HadamardAttention {
            q_proj:  ReluNetConfig::new(self.q_dim, self.hidden_size).init(device),
            v_proj:  ReluNetConfig::new(self.v_dim, self.hidden_size).init(device),
            qv_proj: LinearConfig::new(self.hidden_size, 1).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct HadamardAttention<B: Backend> {
    pub q_proj:  ReluNet<B>,
    pub v_proj:  ReluNet<B>,
    pub qv_proj: Linear<B>,
}

impl<B: Backend> HadamardAttention<B> {
    /// q: [batch, regions, q_dim] (already broadcast), v: [batch, regions, v_dim]
    /// → [batch, regions, 1]
    pub fn forward(&self, q: Tensor<B, 3>, v: Tensor<B, 3>) -> Tensor<B, 3> {
        let qv = self.q_proj.forward(q) * self.v_proj.forward(v);
        self.qv_proj.forward(qv)
    }

    /// Broadcast one question vector per example over its regions and
    /// score them. q: [batch, q_dim], v: [batch, regions, v_dim] → [batch, regions]
    pub fn score_regions(&self, q: Tensor<B, 2>, v: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, regions, _] = v.dims();
        let q = q.unsqueeze_dim::<3>(1).repeat_dim(1, regions);
        self.forward(q, v).reshape([batch, regions])
    }
}

/// Softmax over the region axis. scores: [batch, regions]
pub fn attention_weights<B: Backend>(scores: Tensor<B, 2>) -> Tensor<B, 2> {
    softmax(scores, 1)
}

/// Weighted sum of region vectors.
/// weights: [batch, regions], regions: [batch, regions, hidden] → [batch, hidden]
pub fn attend<B: Backend>(weights: Tensor<B, 2>, regions: Tensor<B, 3>) -> Tensor<B, 2> {
    let [batch, _, hidden] = regions.dims();
    weights
        .unsqueeze_dim::<3>(1)
        .matmul(regions)
        .reshape([batch, hidden])
}
