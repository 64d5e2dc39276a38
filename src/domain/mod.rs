// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types for the things the system talks about:
// questions, image regions, requests and predicted answers.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// A tokenised question
pub mod question;

/// Detector region features for one image
pub mod regions;

/// A question paired with the image it is asked about
pub mod vqa_pair;

/// Answer vocabulary and scored predictions
pub mod answer;

/// Core abstractions (traits) that other layers implement
pub mod traits;
