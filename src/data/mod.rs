// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Takes domain pairs to model-ready tensor batches:
//
//   Vec<VqaPair>
//       │
//       ▼
//   VqaBatcher        → pads questions, stacks regions
//       │
//       ▼
//   VqaBatch          → regions / spatial / tokens / lengths
//
// `synthetic` fabricates pairs for smoke runs.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded random pairs for smoke runs
pub mod synthetic;
