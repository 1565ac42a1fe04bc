// Criterion benchmarks for Mentor Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mentor_match::core::{cluster_population, hungarian::solve_rect, pairwise_matrix, Aggregation, AttributeCost, GroupAttributeCost, Matcher};
use mentor_match::models::{ClusteringOptions, MatchConfig, Population, Record};

const INTERESTS: &[&str] = &["rust", "web", "ml", "python", "design", "css", "databases", "cloud"];
const TRACKS: &[&str] = &["web", "ml", "infra"];

fn create_record(prefix: &str, id: usize) -> Record {
    let interests = format!(
        "{}, {}",
        INTERESTS[id % INTERESTS.len()],
        INTERESTS[(id * 3 + 1) % INTERESTS.len()]
    );
    Record::new(format!("{}{}", prefix, id))
        .with("year", (1 + id % 4) as f64)
        .with("interests", interests)
        .with("track", TRACKS[id % TRACKS.len()])
}

fn create_population(prefix: &str, n: usize) -> Population {
    Population::new((0..n).map(|i| create_record(prefix, i)).collect()).unwrap()
}

fn mentor_cost() -> AttributeCost {
    AttributeCost::new([("interests", 1.0), ("year", 0.5)]).with_scale("year", 4.0)
}

fn bench_similarity_matrix(c: &mut Criterion) {
    let population = create_population("m", 120);
    let cost = mentor_cost();

    c.bench_function("pairwise_matrix_120", |b| {
        b.iter(|| pairwise_matrix(black_box(&population), &cost).unwrap());
    });
}

fn bench_clustering(c: &mut Criterion) {
    let cost = mentor_cost();
    let options = ClusteringOptions::default();

    let mut group = c.benchmark_group("clustering");

    for size in [12, 48, 120].iter() {
        let population = create_population("m", *size);
        group.bench_with_input(BenchmarkId::new("balanced_kmedoids", size), size, |b, _| {
            b.iter(|| cluster_population(black_box(&population), 3, &cost, &options).unwrap());
        });
    }

    group.finish();
}

fn bench_hungarian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hungarian");

    for size in [10, 50, 100].iter() {
        let costs: Vec<Vec<f64>> = (0..*size)
            .map(|i| (0..size * 2).map(|j| ((i * 31 + j * 17) % 97) as f64).collect())
            .collect();
        group.bench_with_input(BenchmarkId::new("solve_rect", size), size, |b, _| {
            b.iter(|| solve_rect(black_box(&costs), size * 2));
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let group_cost = GroupAttributeCost::new(
        AttributeCost::new([("interests", 2.0), ("year", 1.0)]).with_scale("year", 4.0),
        Aggregation::Mean,
    );
    let config = MatchConfig::new(2, 2).with_equal_features(["track"]);
    let matcher = Matcher::new(config, mentor_cost(), group_cost).unwrap();

    let mut group = c.benchmark_group("pipeline");

    for mentors in [12, 60, 120].iter() {
        let mentor_population = create_population("m", *mentors);
        let mentee_population = create_population("e", *mentors);
        group.bench_with_input(BenchmarkId::new("run", mentors), mentors, |b, _| {
            b.iter(|| {
                matcher
                    .run(black_box(&mentor_population), black_box(&mentee_population))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_similarity_matrix,
    bench_clustering,
    bench_hungarian,
    bench_pipeline
);

criterion_main!(benches);
