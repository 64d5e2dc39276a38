// ============================================================
// Layer 3 — Region Feature Set
// ============================================================
// One image, described by the regions an object detector found
// in it. Each region has a feature vector (e.g. 2048 pooled CNN
// activations) and a spatial row (box geometry).
//
// The spatial rows are carried through to the model but do not
// affect its output.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Width of a spatial row when none is supplied:
/// x1, y1, x2, y2, width, height (normalised to the image).
pub const DEFAULT_SPATIAL_DIM: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSet {
    /// One row per region
    #[serde(rename = "regions")]
    pub features: Vec<Vec<f32>>,

    /// One row per region, or empty when no geometry is known
    #[serde(default)]
    pub spatial: Vec<Vec<f32>>,
}

impl RegionSet {
    pub fn new(features: Vec<Vec<f32>>, spatial: Vec<Vec<f32>>) -> Self {
        Self { features, spatial }
    }

    pub fn num_regions(&self) -> usize {
        self.features.len()
    }

    pub fn spatial_dim(&self) -> usize {
        self.spatial.first().map_or(DEFAULT_SPATIAL_DIM, Vec::len)
    }

    /// Spatial rows, with zero rows standing in when none were given.
    pub fn spatial_or_zeros(&self) -> Vec<Vec<f32>> {
        if self.spatial.is_empty() {
            vec![vec![0.0; DEFAULT_SPATIAL_DIM]; self.num_regions()]
        } else {
            self.spatial.clone()
        }
    }

    /// Check the set is usable with a model expecting `feature_dim`-wide regions.
    pub fn validate(&self, feature_dim: usize) -> Result<()> {
        ensure!(self.num_regions() > 0, "an image needs at least one region");
        for (i, row) in self.features.iter().enumerate() {
            ensure!(
                row.len() == feature_dim,
                "region {i} has {} features, expected {feature_dim}",
                row.len()
            );
        }
        if !self.spatial.is_empty() {
            ensure!(
                self.spatial.len() == self.num_regions(),
                "{} spatial rows for {} regions",
                self.spatial.len(),
                self.num_regions()
            );
            let width = self.spatial_dim();
            ensure!(width > 0, "spatial rows must not be empty");
            ensure!(
                self.spatial.iter().all(|row| row.len() == width),
                "spatial rows have differing widths"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_set() {
        let set = RegionSet::new(vec![vec![0.1, 0.2], vec![0.3, 0.4]], Vec::new());
        assert!(set.validate(2).is_ok());
        assert_eq!(set.spatial_or_zeros(), vec![vec![0.0; 6]; 2]);
    }

    #[test]
    fn test_wrong_feature_width() {
        let set = RegionSet::new(vec![vec![0.1, 0.2], vec![0.3]], Vec::new());
        assert!(set.validate(2).is_err());
    }

    #[test]
    fn test_no_regions() {
        let set = RegionSet::new(Vec::new(), Vec::new());
        assert!(set.validate(2).is_err());
    }

    #[test]
    fn test_spatial_row_count_must_match() {
        let set = RegionSet::new(vec![vec![1.0], vec![2.0]], vec![vec![0.0, 0.0, 1.0, 1.0]]);
        assert!(set.validate(1).is_err());
    }

    #[test]
    fn test_spatial_dim_from_rows() {
        let set = RegionSet::new(vec![vec![1.0]], vec![vec![0.0, 0.0, 1.0, 1.0]]);
        assert_eq!(set.spatial_dim(), 4);
        assert!(set.validate(1).is_ok());
    }
}
