use thiserror::Error;

/// Errors that abort a matching run
///
/// No variant ever accompanies a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("round {round}: more groups than remaining targets ({groups} groups, {targets} targets)")]
    OverconstrainedMatching {
        round: usize,
        groups: usize,
        targets: usize,
    },

    #[error("{}", partition_mismatch_message(.missing_from_mentees, .missing_from_mentors))]
    PartitionMismatch {
        missing_from_mentees: Vec<String>,
        missing_from_mentors: Vec<String>,
    },

    #[error("invalid cost {value} between '{row}' and '{column}'")]
    InvalidCost {
        row: String,
        column: String,
        value: f64,
    },

    #[error("duplicate record id: {id}")]
    DuplicateRecordId { id: String },

    #[error("partition {key} worker failed: {reason}")]
    Worker { key: String, reason: String },
}

fn partition_mismatch_message(missing_from_mentees: &[String], missing_from_mentors: &[String]) -> String {
    let mut lines = Vec::new();
    if !missing_from_mentees.is_empty() {
        lines.push(format!(
            "The following groups are missing from mentees: {}",
            missing_from_mentees.join(", ")
        ));
    }
    if !missing_from_mentors.is_empty() {
        lines.push(format!(
            "The following groups are missing from mentors: {}",
            missing_from_mentors.join(", ")
        ));
    }
    lines.join("\n")
}
