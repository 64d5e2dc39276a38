// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here.
//
//   config.rs     — VqaConfig (data + model sections)
//   relu_net.rs   — Linear + ReLU building block
//   encoder.rs    — word embeddings + length-aware bidirectional GRU
//   attention.rs  — Hadamard attention scorer, softmax, pooling
//   model.rs      — QvHadamard: fusion and answer classifier
//   inferencer.rs — batches pairs, runs the model, ranks answers
//
// Reference: Burn Book §3 (Building Blocks)
//            Anderson et al. (2018) Bottom-Up and Top-Down Attention

/// Model and data configuration
pub mod config;

/// Linear + ReLU projection
pub mod relu_net;

/// Question encoder
pub mod encoder;

/// Hadamard attention over image regions
pub mod attention;

/// The full VQA model
pub mod model;

/// Inference engine — runs the model and ranks answers
pub mod inferencer;
