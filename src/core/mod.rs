// Core algorithm exports
pub mod assignment;
pub mod clustering;
pub mod error;
pub mod hungarian;
pub mod matcher;
pub mod partition;
pub mod scoring;
pub mod similarity;

pub use assignment::{assemble_outcome, assign_rounds, match_mentees_to_groups};
pub use clustering::{cluster_population, BalancedKMedoids, Groups};
pub use error::MatchError;
pub use matcher::Matcher;
pub use partition::{split_populations, Partition};
pub use scoring::{Aggregation, AttributeCost, GroupAttributeCost};
pub use similarity::{group_matrix, pairwise_matrix, GroupCost, PairCost};
