//! Mentor Match - many-to-many matching of mentees to mentor groups
//!
//! Mentors are clustered into fixed-size groups with a balanced medoid
//! clustering, then mentees are matched to those groups over several rounds
//! of exact minimum-cost assignment. Optional equality features split both
//! populations into aligned partitions that are matched independently.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use core::{Aggregation, AttributeCost, GroupAttributeCost, GroupCost, MatchError, Matcher, PairCost};
pub use models::{AttributeValue, MatchConfig, MatchOutcome, MenteeAssignmentRow, MentorAssignmentRow, Population, Record};
