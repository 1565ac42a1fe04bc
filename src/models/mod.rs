// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AttributeValue, CostMatrix, PartitionKey, Population, Record, RecordId};
pub use requests::{ClusteringOptions, MatchConfig};
pub use responses::{GroupAssignment, MatchOutcome, MenteeAssignmentRow, MentorAssignmentRow, RunReport};
