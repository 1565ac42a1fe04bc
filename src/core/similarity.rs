use crate::core::error::MatchError;
use crate::models::{CostMatrix, Population, Record};

/// Cost between two records of the same population. Smaller is more similar.
pub trait PairCost: Send + Sync {
    fn cost(&self, a: &Record, b: &Record) -> f64;
}

/// Cost between a group of records and a single record of the other population
pub trait GroupCost: Send + Sync {
    fn cost(&self, group: &[&Record], target: &Record) -> f64;
}

impl<F> PairCost for F
where
    F: Fn(&Record, &Record) -> f64 + Send + Sync,
{
    fn cost(&self, a: &Record, b: &Record) -> f64 {
        self(a, b)
    }
}

impl<F> GroupCost for F
where
    F: Fn(&[&Record], &Record) -> f64 + Send + Sync,
{
    fn cost(&self, group: &[&Record], target: &Record) -> f64 {
        self(group, target)
    }
}

/// Build the square cost matrix of a population against itself
///
/// The diagonal is forced to +infinity so a record can never support itself.
pub fn pairwise_matrix<C: PairCost + ?Sized>(
    population: &Population,
    cost: &C,
) -> Result<CostMatrix, MatchError> {
    let records = population.records();
    let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

    let mut values = Vec::with_capacity(records.len());
    for (i, a) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(records.len());
        for (j, b) in records.iter().enumerate() {
            if i == j {
                row.push(f64::INFINITY);
                continue;
            }
            row.push(checked(cost.cost(a, b), &a.id, &b.id)?);
        }
        values.push(row);
    }

    Ok(CostMatrix {
        row_ids: ids.clone(),
        column_ids: ids,
        values,
    })
}

/// Build the groups-by-targets cost matrix used for assignment
///
/// `groups` holds positions into `members`; row ids are the group ids.
pub fn group_matrix<C: GroupCost + ?Sized>(
    members: &Population,
    groups: &[Vec<usize>],
    targets: &Population,
    cost: &C,
) -> Result<CostMatrix, MatchError> {
    let mut values = Vec::with_capacity(groups.len());
    for (group_id, group) in groups.iter().enumerate() {
        let group_records: Vec<&Record> = group
            .iter()
            .filter_map(|&p| members.get(p))
            .collect();
        let label = format!("group {}", group_id);

        let mut row = Vec::with_capacity(targets.len());
        for target in targets.records() {
            row.push(checked(cost.cost(&group_records, target), &label, &target.id)?);
        }
        values.push(row);
    }

    Ok(CostMatrix {
        row_ids: (0..groups.len()).map(|g| g.to_string()).collect(),
        column_ids: targets.ids().map(str::to_string).collect(),
        values,
    })
}

#[inline]
fn checked(value: f64, row: &str, column: &str) -> Result<f64, MatchError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MatchError::InvalidCost {
            row: row.to_string(),
            column: column.to_string(),
            value,
        })
    }
}
