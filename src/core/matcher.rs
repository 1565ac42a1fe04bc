use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, info};

use crate::core::{
    assignment::match_mentees_to_groups,
    clustering::cluster_population,
    error::MatchError,
    partition::{split_populations, Partition},
    similarity::{GroupCost, PairCost},
};
use crate::models::{MatchConfig, MatchOutcome, Population};

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Equality partitioning of both populations (skipped without features)
/// 2. Mentor clustering into fixed-size groups, per partition
/// 3. Multi-round optimal assignment of mentees to groups, per partition
/// 4. Concatenation of every partition's tables, in partition-key order
#[derive(Debug, Clone)]
pub struct Matcher<P, G> {
    config: MatchConfig,
    mentor_cost: P,
    group_cost: G,
}

impl<P: PairCost, G: GroupCost> Matcher<P, G> {
    /// Create a matcher; the configuration is validated up front
    pub fn new(config: MatchConfig, mentor_cost: P, group_cost: G) -> Result<Self, MatchError> {
        config.check()?;
        Ok(Self {
            config,
            mentor_cost,
            group_cost,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match mentees to mentor groups, honouring `features_must_be_equal`
    ///
    /// Partitions run one after another. Any failure aborts the whole run and
    /// no tables are returned.
    pub fn run(&self, mentors: &Population, mentees: &Population) -> Result<MatchOutcome, MatchError> {
        let partitions = split_populations(mentors, mentees, &self.config.features_must_be_equal)?;
        info!(
            mentors = mentors.len(),
            mentees = mentees.len(),
            partitions = partitions.len(),
            "starting matching run"
        );

        let mut outcome = MatchOutcome::default();
        for partition in &partitions {
            let mentor_slice = mentors.subset(&partition.mentors);
            let mentee_slice = mentees.subset(&partition.mentees);
            outcome.extend(self.run_partition(partition, &mentor_slice, &mentee_slice)?);
        }

        info!(
            groups = outcome.groups.len(),
            matched_mentees = outcome.matched_mentees(),
            "matching run complete"
        );
        Ok(outcome)
    }

    /// Cluster and assign over whole populations, ignoring equality features
    pub fn match_unconstrained(
        &self,
        mentors: &Population,
        mentees: &Population,
    ) -> Result<MatchOutcome, MatchError> {
        let groups = cluster_population(
            mentors,
            self.config.group_size,
            &self.mentor_cost,
            &self.config.clustering,
        )?;
        debug!(groups = groups.len(), "mentor groups formed");

        match_mentees_to_groups(
            mentors,
            mentees,
            &groups,
            self.config.mentees_per_mentor,
            &self.group_cost,
        )
    }

    fn run_partition(
        &self,
        partition: &Partition,
        mentors: &Population,
        mentees: &Population,
    ) -> Result<MatchOutcome, MatchError> {
        info!(
            key = %partition.key,
            mentors = mentors.len(),
            mentees = mentees.len(),
            "matching partition"
        );
        self.match_unconstrained(mentors, mentees)
    }
}

impl<P, G> Matcher<P, G>
where
    P: PairCost + 'static,
    G: GroupCost + 'static,
{
    /// Same result as [`Matcher::run`], with each partition on a blocking worker
    ///
    /// Every worker owns only its own partition's records. Results are joined
    /// and reassembled in partition-key order; when several partitions fail,
    /// the error of the first one in key order is returned.
    pub async fn run_parallel(
        self: Arc<Self>,
        mentors: &Population,
        mentees: &Population,
    ) -> Result<MatchOutcome, MatchError> {
        let partitions = split_populations(mentors, mentees, &self.config.features_must_be_equal)?;
        info!(
            mentors = mentors.len(),
            mentees = mentees.len(),
            partitions = partitions.len(),
            "starting parallel matching run"
        );

        let keys: Vec<String> = partitions.iter().map(|p| p.key.to_string()).collect();
        let mut tasks = JoinSet::new();
        let mut task_keys: HashMap<task::Id, usize> = HashMap::with_capacity(keys.len());
        for (index, partition) in partitions.into_iter().enumerate() {
            let mentor_slice = mentors.subset(&partition.mentors);
            let mentee_slice = mentees.subset(&partition.mentees);
            let matcher = Arc::clone(&self);
            let handle = tasks.spawn_blocking(move || {
                (index, matcher.run_partition(&partition, &mentor_slice, &mentee_slice))
            });
            task_keys.insert(handle.id(), index);
        }

        let mut results: Vec<Option<Result<MatchOutcome, MatchError>>> = vec![None; keys.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => return Err(worker_failure(&keys, &task_keys, &e)),
            }
        }

        let mut outcome = MatchOutcome::default();
        for (key, result) in keys.into_iter().zip(results) {
            let partition_outcome = result.ok_or_else(|| MatchError::Worker {
                key,
                reason: "worker finished without a result".to_string(),
            })??;
            outcome.extend(partition_outcome);
        }

        info!(
            groups = outcome.groups.len(),
            matched_mentees = outcome.matched_mentees(),
            "parallel matching run complete"
        );
        Ok(outcome)
    }
}

/// Name the partition whose worker did not finish
fn worker_failure(keys: &[String], task_keys: &HashMap<task::Id, usize>, error: &JoinError) -> MatchError {
    let key = task_keys
        .get(&error.id())
        .and_then(|&index| keys.get(index))
        .cloned()
        .unwrap_or_else(|| format!("task {}", error.id()));
    MatchError::Worker {
        key,
        reason: error.to_string(),
    }
}
