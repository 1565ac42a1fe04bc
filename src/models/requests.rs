use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::MatchError;

/// Parameters of one matching run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchConfig {
    /// Mentors per mentor group (and therefore per mentee)
    #[validate(range(min = 1))]
    pub group_size: usize,
    /// Assignment rounds, i.e. mentees per mentor group
    #[validate(range(min = 1))]
    pub mentees_per_mentor: usize,
    /// Attributes whose values must be equal between matched records
    #[serde(default)]
    pub features_must_be_equal: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub clustering: ClusteringOptions,
}

impl MatchConfig {
    pub fn new(group_size: usize, mentees_per_mentor: usize) -> Self {
        Self {
            group_size,
            mentees_per_mentor,
            features_must_be_equal: Vec::new(),
            clustering: ClusteringOptions::default(),
        }
    }

    pub fn with_equal_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features_must_be_equal = features.into_iter().map(Into::into).collect();
        self
    }

    /// Validate, translating failures into `InvalidConfiguration`
    pub fn check(&self) -> Result<(), MatchError> {
        self.validate()
            .map_err(|e| MatchError::InvalidConfiguration {
                reason: e.to_string(),
            })
    }
}

/// Convergence controls for the medoid clustering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct ClusteringOptions {
    #[serde(default = "default_max_iterations")]
    #[validate(range(min = 1))]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    #[validate(range(min = 0.0))]
    pub tolerance: f64,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_max_iterations() -> usize { 10 }
fn default_tolerance() -> f64 { 0.001 }
