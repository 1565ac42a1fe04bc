use std::collections::BTreeMap;

use crate::core::error::MatchError;
use crate::models::{PartitionKey, Population};

/// Aligned slice of both populations sharing one partition key
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub key: PartitionKey,
    /// Positions into the mentor population, in original order
    pub mentors: Vec<usize>,
    /// Positions into the mentee population, in original order
    pub mentees: Vec<usize>,
}

/// Group record positions by their key over `features`, keys sorted
pub fn group_by_key(population: &Population, features: &[String]) -> BTreeMap<PartitionKey, Vec<usize>> {
    let mut grouped: BTreeMap<PartitionKey, Vec<usize>> = BTreeMap::new();
    for (position, record) in population.records().iter().enumerate() {
        grouped
            .entry(PartitionKey::of(record, features))
            .or_default()
            .push(position);
    }
    grouped
}

/// Split both populations on `features` and check the key sets agree
///
/// With no features the whole of both populations forms a single partition.
/// Otherwise every key must occur on both sides; any key seen on only one
/// side fails the split, and both directions are reported.
pub fn split_populations(
    mentors: &Population,
    mentees: &Population,
    features: &[String],
) -> Result<Vec<Partition>, MatchError> {
    if features.is_empty() {
        return Ok(vec![Partition {
            key: PartitionKey(Vec::new()),
            mentors: (0..mentors.len()).collect(),
            mentees: (0..mentees.len()).collect(),
        }]);
    }

    let mentor_groups = group_by_key(mentors, features);
    let mut mentee_groups = group_by_key(mentees, features);

    let missing_from_mentees: Vec<String> = mentor_groups
        .keys()
        .filter(|k| !mentee_groups.contains_key(*k))
        .map(ToString::to_string)
        .collect();
    let missing_from_mentors: Vec<String> = mentee_groups
        .keys()
        .filter(|k| !mentor_groups.contains_key(*k))
        .map(ToString::to_string)
        .collect();

    if !missing_from_mentees.is_empty() || !missing_from_mentors.is_empty() {
        return Err(MatchError::PartitionMismatch {
            missing_from_mentees,
            missing_from_mentors,
        });
    }

    Ok(mentor_groups
        .into_iter()
        .filter_map(|(key, mentor_positions)| {
            mentee_groups.remove(&key).map(|mentee_positions| Partition {
                key,
                mentors: mentor_positions,
                mentees: mentee_positions,
            })
        })
        .collect())
}
