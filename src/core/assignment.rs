use tracing::debug;

use crate::core::clustering::Groups;
use crate::core::error::MatchError;
use crate::core::hungarian::{solve_rect, total_cost};
use crate::core::similarity::{group_matrix, GroupCost};
use crate::models::{
    CostMatrix, GroupAssignment, MatchOutcome, MenteeAssignmentRow, MentorAssignmentRow, Population,
};

/// Match each mentor group to `rounds` distinct mentees and build the result tables
pub fn match_mentees_to_groups<C: GroupCost + ?Sized>(
    mentors: &Population,
    mentees: &Population,
    groups: &Groups,
    rounds: usize,
    cost: &C,
) -> Result<MatchOutcome, MatchError> {
    let matrix = group_matrix(mentors, groups, mentees, cost)?;
    let matches = assign_rounds(&matrix, rounds)?;
    Ok(assemble_outcome(mentors, mentees, groups, &matches))
}

/// Run `rounds` optimal assignment passes over a shrinking mentee pool
///
/// Returns, per row (group), the matched column positions in round order.
/// Columns matched in one round are dropped before the next, so no column is
/// ever matched twice. Fails before solving a round that has more rows than
/// columns left.
pub fn assign_rounds(matrix: &CostMatrix, rounds: usize) -> Result<Vec<Vec<usize>>, MatchError> {
    let groups = matrix.rows();
    let mut remaining: Vec<usize> = (0..matrix.columns()).collect();
    let mut matches: Vec<Vec<usize>> = vec![Vec::with_capacity(rounds); groups];

    for round in 0..rounds {
        if groups > remaining.len() {
            return Err(MatchError::OverconstrainedMatching {
                round,
                groups,
                targets: remaining.len(),
            });
        }

        let pool = matrix.select_columns(&remaining);
        let assignment = solve_rect(&pool.values, pool.columns()).ok_or(
            MatchError::OverconstrainedMatching {
                round,
                groups,
                targets: remaining.len(),
            },
        )?;
        debug!(
            round,
            groups,
            pool = remaining.len(),
            cost = total_cost(&pool.values, &assignment),
            "assignment round solved"
        );

        let mut taken = vec![false; remaining.len()];
        for (group, &local) in assignment.iter().enumerate() {
            matches[group].push(remaining[local]);
            taken[local] = true;
        }
        remaining = remaining
            .into_iter()
            .zip(taken)
            .filter_map(|(column, used)| (!used).then_some(column))
            .collect();
    }

    Ok(matches)
}

/// Turn per-group matches into the group, mentor and mentee views
pub fn assemble_outcome(
    mentors: &Population,
    mentees: &Population,
    groups: &Groups,
    matches: &[Vec<usize>],
) -> MatchOutcome {
    let rounds = matches.iter().map(Vec::len).max().unwrap_or(0);
    let width = groups.iter().map(Vec::len).max().unwrap_or(0);

    let mentor_id = |p: usize| mentors.get(p).map(|r| r.id.clone());
    let mentee_id = |p: usize| mentees.get(p).map(|r| r.id.clone());

    let group_assignments: Vec<GroupAssignment> = groups
        .iter()
        .enumerate()
        .map(|(group_id, members)| GroupAssignment {
            group_id,
            members: members.iter().filter_map(|&p| mentor_id(p)).collect(),
            mentees: matches
                .get(group_id)
                .map(|m| m.iter().filter_map(|&p| mentee_id(p)).collect())
                .unwrap_or_default(),
        })
        .collect();

    let mut group_of_mentor = vec![None; mentors.len()];
    for (group_id, members) in groups.iter().enumerate() {
        for &p in members {
            if let Some(slot) = group_of_mentor.get_mut(p) {
                *slot = Some(group_id);
            }
        }
    }

    let mut group_of_mentee = vec![None; mentees.len()];
    for (group_id, matched) in matches.iter().enumerate() {
        for &p in matched {
            if let Some(slot) = group_of_mentee.get_mut(p) {
                *slot = Some(group_id);
            }
        }
    }

    let by_mentor = mentors
        .records()
        .iter()
        .zip(&group_of_mentor)
        .map(|(record, group)| {
            let mut assignments: Vec<Option<String>> = group
                .and_then(|g| group_assignments.get(g))
                .map(|g| g.mentees.iter().cloned().map(Some).collect())
                .unwrap_or_default();
            assignments.resize(rounds, None);
            MentorAssignmentRow {
                mentor: record.id.clone(),
                assignments,
            }
        })
        .collect();

    let by_mentee = mentees
        .records()
        .iter()
        .zip(&group_of_mentee)
        .map(|(record, group)| {
            let mut mentors: Vec<Option<String>> = group
                .and_then(|g| group_assignments.get(g))
                .map(|g| g.members.iter().cloned().map(Some).collect())
                .unwrap_or_default();
            mentors.resize(width, None);
            MenteeAssignmentRow {
                mentee: record.id.clone(),
                mentors,
            }
        })
        .collect();

    MatchOutcome {
        groups: group_assignments,
        by_mentor,
        by_mentee,
        partitions: 1,
    }
}
