// ============================================================
// Layer 3 — VqaPair Domain Type
// ============================================================
// The unit of work: one question about one image.

use serde::{Deserialize, Serialize};

use crate::domain::{question::Question, regions::RegionSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqaPair {
    pub question: Question,
    pub regions:  RegionSet,
}

impl VqaPair {
    pub fn new(question: Question, regions: RegionSet) -> Self {
        Self { question, regions }
    }
}

/// A request as it appears in a requests file. Either the question
/// text or pre-tokenised ids must be present; ids win when both are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VqaRequest {
    #[serde(default)]
    pub question: Option<String>,

    #[serde(default)]
    pub token_ids: Option<Vec<u32>>,

    #[serde(flatten)]
    pub regions: RegionSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_flat_regions() {
        let json = r#"{
            "question": "is it raining?",
            "regions": [[0.5, 0.25], [0.0, 1.0]],
            "spatial": [[0.0, 0.0, 1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 0.5, 0.5, 0.5, 0.5]]
        }"#;
        let req: VqaRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.question.as_deref(), Some("is it raining?"));
        assert!(req.token_ids.is_none());
        assert_eq!(req.regions.num_regions(), 2);
        assert_eq!(req.regions.spatial_dim(), 6);
    }

    #[test]
    fn test_request_without_spatial() {
        let json = r#"{ "token_ids": [3, 4], "regions": [[0.5]] }"#;
        let req: VqaRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.token_ids, Some(vec![3, 4]));
        assert!(req.regions.spatial.is_empty());
    }

    #[test]
    fn test_request_needs_regions() {
        let json = r#"{ "question": "what is this?" }"#;
        assert!(serde_json::from_str::<VqaRequest>(json).is_err());
    }
}
