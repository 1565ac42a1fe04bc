// Unit tests for Mentor Match

use mentor_match::core::{
    assign_rounds,
    clustering::{check_group_size, cluster_population, singleton_groups},
    hungarian::solve_rect,
    pairwise_matrix,
    scoring::attribute_distance,
    split_populations, AttributeCost, BalancedKMedoids, MatchError, PairCost,
};
use mentor_match::models::{AttributeValue, ClusteringOptions, CostMatrix, PartitionKey, Population, Record};
use std::collections::HashSet;

fn profile(id: &str, year: f64, interests: &str) -> Record {
    Record::new(id).with("year", year).with("interests", interests)
}

fn cohort() -> Population {
    Population::new(vec![
        profile("a", 1.0, "rust, web"),
        profile("b", 1.0, "rust"),
        profile("c", 4.0, "ml, python"),
        profile("d", 4.0, "python"),
        profile("e", 2.0, "design"),
        profile("f", 2.0, "design, css"),
    ])
    .unwrap()
}

#[test]
fn test_group_size_validation() {
    assert!(check_group_size(6, 2).is_ok());
    assert!(check_group_size(6, 6).is_ok());
    assert!(matches!(check_group_size(6, 0), Err(MatchError::InvalidConfiguration { .. })));
    assert!(matches!(check_group_size(6, 7), Err(MatchError::InvalidConfiguration { .. })));
    assert!(matches!(check_group_size(7, 2), Err(MatchError::InvalidConfiguration { .. })));
}

#[test]
fn test_group_size_error_names_value() {
    let err = check_group_size(3, 5).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid configuration: group size 5 exceeds population size 3"
    );
}

#[test]
fn test_singleton_groups() {
    assert_eq!(singleton_groups(3), vec![vec![0], vec![1], vec![2]]);
    assert!(singleton_groups(0).is_empty());
}

#[test]
fn test_clustering_groups_similar_profiles() {
    let cost = AttributeCost::new([("year", 1.0), ("interests", 1.0)]).with_scale("year", 3.0);
    let groups = cluster_population(&cohort(), 2, &cost, &ClusteringOptions::default()).unwrap();

    let as_sets: HashSet<Vec<usize>> = groups.into_iter().collect();
    assert!(as_sets.contains(&vec![0, 1]));
    assert!(as_sets.contains(&vec![2, 3]));
    assert!(as_sets.contains(&vec![4, 5]));
}

#[test]
fn test_kmedoids_rejects_non_square_matrix() {
    let matrix = CostMatrix {
        row_ids: vec!["a".into(), "b".into()],
        column_ids: vec!["a".into(), "b".into(), "c".into()],
        values: vec![vec![f64::INFINITY, 1.0, 2.0], vec![1.0, f64::INFINITY, 2.0]],
    };

    assert!(BalancedKMedoids::new(&matrix, 2).is_err());
}

#[test]
fn test_intra_group_cost_counts_ordered_pairs() {
    let population = cohort();
    let cost = |a: &Record, b: &Record| {
        let ya = a.get("year").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let yb = b.get("year").and_then(|v| v.as_f64()).unwrap_or(0.0);
        (ya - yb).abs()
    };
    let matrix = pairwise_matrix(&population, &cost).unwrap();
    let km = BalancedKMedoids::new(&matrix, 3).unwrap();

    // {a, b, c}: 0 + 3 + 3, twice; {d, e, f}: 2 + 2 + 0, twice
    let total = km.intra_group_cost(&vec![vec![0, 1, 2], vec![3, 4, 5]]);
    assert_eq!(total, 20.0);
}

#[test]
fn test_pairwise_matrix_with_attribute_cost() {
    let cost = AttributeCost::new([("interests", 1.0)]);
    let matrix = pairwise_matrix(&cohort(), &cost).unwrap();

    assert_eq!(matrix.rows(), 6);
    assert!(matrix.get(3, 3).is_infinite());
    assert_eq!(matrix.get(2, 3), 0.5);
    assert_eq!(matrix.get(0, 4), 1.0);
}

#[test]
fn test_assign_rounds_with_single_round() {
    let matrix = CostMatrix {
        row_ids: vec!["0".into()],
        column_ids: vec!["x".into(), "y".into()],
        values: vec![vec![3.0, 1.0]],
    };

    assert_eq!(assign_rounds(&matrix, 1).unwrap(), vec![vec![1]]);
    assert!(matches!(
        assign_rounds(&matrix, 3),
        Err(MatchError::OverconstrainedMatching { round: 2, .. })
    ));
}

#[test]
fn test_solve_rect_square_identity() {
    let costs = vec![
        vec![0.0, 9.0, 9.0],
        vec![9.0, 0.0, 9.0],
        vec![9.0, 9.0, 0.0],
    ];
    assert_eq!(solve_rect(&costs, 3).unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_attribute_distance_numbers() {
    let a = AttributeValue::from(1.0);
    let b = AttributeValue::from(3.0);
    assert_eq!(attribute_distance(Some(&a), Some(&b), 4.0), 0.5);
    assert_eq!(attribute_distance(Some(&a), None, 4.0), 1.0);
}

#[test]
fn test_attribute_cost_symmetric_for_symmetric_inputs() {
    let cost = AttributeCost::new([("year", 1.0), ("interests", 1.0)]);
    let a = profile("a", 1.0, "rust, web");
    let b = profile("b", 2.0, "web");

    assert_eq!(cost.cost(&a, &b), cost.cost(&b, &a));
}

#[test]
fn test_partition_key_display() {
    let record = Record::new("x").with("track", "B").with("cohort", 2i64).with("remote", true);
    let key = PartitionKey::of(&record, &["track".to_string(), "cohort".to_string(), "remote".to_string()]);

    assert_eq!(key.to_string(), "(\"B\", 2, true)");
}

#[test]
fn test_split_populations_every_record_in_one_partition() {
    let mentors = cohort();
    let mentees = Population::new(vec![
        profile("x", 1.0, ""),
        profile("y", 2.0, ""),
        profile("z", 4.0, ""),
    ])
    .unwrap();

    let partitions = split_populations(&mentors, &mentees, &["year".to_string()]).unwrap();

    assert_eq!(partitions.len(), 3);
    let mut mentor_positions: Vec<usize> = partitions.iter().flat_map(|p| p.mentors.clone()).collect();
    mentor_positions.sort_unstable();
    assert_eq!(mentor_positions, vec![0, 1, 2, 3, 4, 5]);
}
