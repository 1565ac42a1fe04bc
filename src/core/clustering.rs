use tracing::{debug, warn};

use crate::core::error::MatchError;
use crate::core::similarity::{pairwise_matrix, PairCost};
use crate::models::{ClusteringOptions, CostMatrix, Population};

/// Group id → member positions (ascending) in the clustered population
pub type Groups = Vec<Vec<usize>>;

/// Partition `population` into groups of exactly `group_size` records
///
/// `group_size == 1` short-circuits to singleton groups without evaluating
/// the cost function. Otherwise the mentor-mentor cost matrix is built and
/// handed to [`BalancedKMedoids`].
pub fn cluster_population<C: PairCost + ?Sized>(
    population: &Population,
    group_size: usize,
    cost: &C,
    options: &ClusteringOptions,
) -> Result<Groups, MatchError> {
    check_group_size(population.len(), group_size)?;

    if group_size == 1 {
        return Ok(singleton_groups(population.len()));
    }

    let matrix = pairwise_matrix(population, cost)?;
    BalancedKMedoids::new(&matrix, group_size)?.run(options)
}

/// Reject group sizes that cannot tile the population exactly
pub fn check_group_size(population: usize, group_size: usize) -> Result<(), MatchError> {
    if group_size == 0 {
        return Err(MatchError::InvalidConfiguration {
            reason: "group size must be at least 1".to_string(),
        });
    }
    if group_size > population {
        return Err(MatchError::InvalidConfiguration {
            reason: format!(
                "group size {} exceeds population size {}",
                group_size, population
            ),
        });
    }
    if population % group_size != 0 {
        return Err(MatchError::InvalidConfiguration {
            reason: format!(
                "population of {} records cannot be split evenly into groups of {} ({} left over)",
                population,
                group_size,
                population % group_size
            ),
        });
    }
    Ok(())
}

/// One group per record, in population order
pub fn singleton_groups(population: usize) -> Groups {
    (0..population).map(|i| vec![i]).collect()
}

/// Medoid clustering with a hard cap on group cardinality
///
/// # Procedure
/// 1. Deterministic seeding: the record with the lowest total cost to everyone
///    else, then repeatedly the record farthest from all chosen medoids.
/// 2. Assignment: records are placed in order of their best medoid cost; each
///    takes the cheapest group that still has room.
/// 3. Update: each group's medoid becomes the member with the lowest summed
///    cost to the rest of the group.
/// 4. Stop when the intra-group cost improves by less than the tolerance, the
///    medoids stop moving, or the iteration cap is hit. The cheapest partition
///    seen is returned.
pub struct BalancedKMedoids<'a> {
    matrix: &'a CostMatrix,
    clusters: usize,
    capacity: usize,
}

impl<'a> BalancedKMedoids<'a> {
    pub fn new(matrix: &'a CostMatrix, group_size: usize) -> Result<Self, MatchError> {
        check_group_size(matrix.rows(), group_size)?;
        if matrix.rows() != matrix.columns() {
            return Err(MatchError::InvalidConfiguration {
                reason: format!(
                    "clustering needs a square cost matrix, got {}x{}",
                    matrix.rows(),
                    matrix.columns()
                ),
            });
        }

        Ok(Self {
            matrix,
            clusters: matrix.rows() / group_size,
            capacity: group_size,
        })
    }

    pub fn clusters(&self) -> usize {
        self.clusters
    }

    pub fn run(&self, options: &ClusteringOptions) -> Result<Groups, MatchError> {
        let mut medoids = self.initial_medoids();
        let mut best: Option<(f64, Groups)> = None;
        let mut previous_cost = f64::INFINITY;

        for iteration in 1..=options.max_iterations {
            let groups = self.assign(&medoids);
            let cost = self.intra_group_cost(&groups);
            debug!(iteration, cost, "clustering iteration");

            let improved = best.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost);
            let next_medoids = self.update_medoids(&groups);
            if improved {
                best = Some((cost, groups));
            }

            if previous_cost - cost < options.tolerance || next_medoids == medoids {
                debug!(iteration, "clustering converged");
                break;
            }
            if iteration == options.max_iterations {
                warn!(
                    max_iterations = options.max_iterations,
                    cost, "clustering stopped at iteration cap before converging"
                );
            }

            previous_cost = cost;
            medoids = next_medoids;
        }

        best.map(|(_, groups)| groups)
            .ok_or_else(|| MatchError::InvalidConfiguration {
                reason: "clustering needs at least one iteration".to_string(),
            })
    }

    fn initial_medoids(&self) -> Vec<usize> {
        let n = self.matrix.rows();
        let mut medoids = Vec::with_capacity(self.clusters);

        let row_sum = |i: usize| -> f64 {
            (0..n).filter(|&j| j != i).map(|j| self.matrix.get(i, j)).sum()
        };
        let first = (0..n)
            .min_by(|&a, &b| row_sum(a).total_cmp(&row_sum(b)).then(a.cmp(&b)))
            .unwrap_or(0);
        medoids.push(first);

        while medoids.len() < self.clusters {
            let distance_to_chosen = |c: usize| -> f64 {
                medoids
                    .iter()
                    .map(|&m| self.matrix.get(c, m))
                    .fold(f64::INFINITY, f64::min)
            };
            let mut next: Option<(usize, f64)> = None;
            for candidate in (0..n).filter(|c| !medoids.contains(c)) {
                let d = distance_to_chosen(candidate);
                // strict comparison keeps the lowest position on ties
                if next.map_or(true, |(_, best)| d > best) {
                    next = Some((candidate, d));
                }
            }
            match next {
                Some((candidate, _)) => medoids.push(candidate),
                None => break,
            }
        }

        medoids
    }

    fn assign(&self, medoids: &[usize]) -> Groups {
        let n = self.matrix.rows();
        let mut groups: Groups = medoids.iter().map(|&m| vec![m]).collect();

        // Each record's groups ordered by cost to the group's medoid, then id
        let mut preferences: Vec<(usize, Vec<usize>)> = (0..n)
            .filter(|p| !medoids.contains(p))
            .map(|p| {
                let mut order: Vec<usize> = (0..medoids.len()).collect();
                order.sort_by(|&a, &b| {
                    self.matrix
                        .get(p, medoids[a])
                        .total_cmp(&self.matrix.get(p, medoids[b]))
                        .then(a.cmp(&b))
                });
                (p, order)
            })
            .collect();

        preferences.sort_by(|(pa, oa), (pb, ob)| {
            self.matrix
                .get(*pa, medoids[oa[0]])
                .total_cmp(&self.matrix.get(*pb, medoids[ob[0]]))
                .then(pa.cmp(pb))
        });

        for (point, order) in preferences {
            if let Some(&group) = order.iter().find(|&&g| groups[g].len() < self.capacity) {
                groups[group].push(point);
            }
        }

        for group in &mut groups {
            group.sort_unstable();
        }
        groups
    }

    fn update_medoids(&self, groups: &Groups) -> Vec<usize> {
        groups
            .iter()
            .map(|members| {
                let spread = |m: usize| -> f64 {
                    members
                        .iter()
                        .filter(|&&o| o != m)
                        .map(|&o| self.matrix.get(m, o))
                        .sum()
                };
                members
                    .iter()
                    .copied()
                    .min_by(|&a, &b| spread(a).total_cmp(&spread(b)).then(a.cmp(&b)))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Sum of costs over all ordered pairs of distinct members, across groups
    pub fn intra_group_cost(&self, groups: &Groups) -> f64 {
        groups
            .iter()
            .map(|members| {
                members
                    .iter()
                    .flat_map(|&a| members.iter().filter(move |&&b| b != a).map(move |&b| (a, b)))
                    .map(|(a, b)| self.matrix.get(a, b))
                    .sum::<f64>()
            })
            .sum()
    }
}
