use serde::{Deserialize, Serialize};
use crate::models::domain::RecordId;

/// One mentor group and the mentees it received, in round order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignment {
    /// Group id, unique within the run (partitions are numbered consecutively)
    pub group_id: usize,
    pub members: Vec<RecordId>,
    pub mentees: Vec<RecordId>,
}

/// Mentor view: every mentor with its group's mentees, one slot per round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorAssignmentRow {
    pub mentor: RecordId,
    pub assignments: Vec<Option<RecordId>>,
}

/// Mentee view: every mentee with the members of the group it was matched to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenteeAssignmentRow {
    pub mentee: RecordId,
    pub mentors: Vec<Option<RecordId>>,
}

impl MenteeAssignmentRow {
    pub fn is_assigned(&self) -> bool {
        self.mentors.iter().any(Option::is_some)
    }
}

/// Final result of a matching run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub groups: Vec<GroupAssignment>,
    pub by_mentor: Vec<MentorAssignmentRow>,
    pub by_mentee: Vec<MenteeAssignmentRow>,
    /// Number of equality partitions that were matched independently
    #[serde(default)]
    pub partitions: usize,
}

impl MatchOutcome {
    /// Append another partition's tables, renumbering its group ids after ours
    pub fn extend(&mut self, other: MatchOutcome) {
        let offset = self.groups.len();
        self.groups.extend(other.groups.into_iter().map(|mut g| {
            g.group_id += offset;
            g
        }));
        self.by_mentor.extend(other.by_mentor);
        self.by_mentee.extend(other.by_mentee);
        self.partitions += other.partitions;
    }

    pub fn matched_mentees(&self) -> usize {
        self.by_mentee.iter().filter(|row| row.is_assigned()).count()
    }
}

/// Summary written next to the result tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: uuid::Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub mentors: usize,
    pub mentees: usize,
    pub groups: usize,
    pub partitions: usize,
    pub matched_mentees: usize,
}
