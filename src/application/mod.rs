// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case drives the lower layers through one command's
// workflow. No tensor math and no printing happen here.
//
//   init_config  — write a default model config
//   inspect      — build a model, count parameters, smoke-test it
//   answer       — answer question/region requests

pub mod init_config_use_case;

pub mod inspect_use_case;

pub mod answer_use_case;
