// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem:
//
//   config_store.rs    — VqaConfig as JSON, validated on load
//
//   tokenizer_store.rs — WordLevel tokenizer JSON; built from the
//                        embedding vocabulary when missing so ids
//                        and embedding rows line up
//
//   embeddings.rs      — GloVe-format pretrained word vectors
//
//   json_files.rs      — requests and answer vocabulary files
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Model configuration persistence
pub mod config_store;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Pretrained embedding table reader
pub mod embeddings;

/// Request and answer-label files
pub mod json_files;
