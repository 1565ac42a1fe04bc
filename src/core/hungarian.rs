//! Exact minimum-cost assignment for rectangular cost matrices.
//!
//! Shortest augmenting path form of the Hungarian (Kuhn-Munkres) method with
//! row/column potentials. Every row is matched to a distinct column, so the
//! matrix must have at least as many columns as rows. Runs in O(rows² · columns).

/// Solve the assignment problem for `costs` (rows × `columns`, all finite).
///
/// Returns `result[row] = column`, minimizing the summed cost. Returns `None`
/// when there are more rows than columns. Ties resolve toward the lowest
/// column index, so the result is deterministic for a given input.
pub fn solve_rect(costs: &[Vec<f64>], columns: usize) -> Option<Vec<usize>> {
    let rows = costs.len();
    if rows == 0 {
        return Some(Vec::new());
    }
    if rows > columns {
        return None;
    }

    // 1-based; index 0 is the virtual root of each augmenting tree
    let mut u = vec![0.0f64; rows + 1];
    let mut v = vec![0.0f64; columns + 1];
    let mut owner = vec![0usize; columns + 1];
    let mut way = vec![0usize; columns + 1];

    for row in 1..=rows {
        owner[0] = row;
        let mut j0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; columns + 1];
        let mut used = vec![false; columns + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=columns {
                if used[j] {
                    continue;
                }
                let reduced = costs[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < min_slack[j] {
                    min_slack[j] = reduced;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=columns {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the root
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; rows];
    for j in 1..=columns {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = j - 1;
        }
    }
    Some(assignment)
}

/// Summed cost of an assignment produced by [`solve_rect`]
pub fn total_cost(costs: &[Vec<f64>], assignment: &[usize]) -> f64 {
    assignment
        .iter()
        .enumerate()
        .map(|(row, &column)| costs[row][column])
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(costs: &[Vec<f64>], columns: usize) -> f64 {
        fn walk(costs: &[Vec<f64>], row: usize, taken: &mut Vec<bool>, acc: f64, best: &mut f64) {
            if row == costs.len() {
                *best = best.min(acc);
                return;
            }
            for c in 0..taken.len() {
                if !taken[c] {
                    taken[c] = true;
                    walk(costs, row + 1, taken, acc + costs[row][c], best);
                    taken[c] = false;
                }
            }
        }
        let mut best = f64::INFINITY;
        walk(costs, 0, &mut vec![false; columns], 0.0, &mut best);
        best
    }

    // Small deterministic generator so the test needs no RNG crate
    fn lcg_matrix(seed: u64, rows: usize, columns: usize) -> Vec<Vec<f64>> {
        let mut state = seed;
        (0..rows)
            .map(|_| {
                (0..columns)
                    .map(|_| {
                        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                        ((state >> 33) % 100) as f64
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_square_known_optimum() {
        let costs = vec![
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ];
        let assignment = solve_rect(&costs, 3).unwrap();

        assert_eq!(assignment, vec![1, 0, 2]);
        assert_eq!(total_cost(&costs, &assignment), 5.0);
    }

    #[test]
    fn test_rectangular_matches_brute_force() {
        for seed in 1..40u64 {
            let rows = 1 + (seed as usize % 4);
            let columns = rows + (seed as usize % 3);
            let costs = lcg_matrix(seed, rows, columns);

            let assignment = solve_rect(&costs, columns).unwrap();
            let mut seen = vec![false; columns];
            for &c in &assignment {
                assert!(!seen[c], "column {} used twice", c);
                seen[c] = true;
            }
            assert_eq!(total_cost(&costs, &assignment), brute_force(&costs, columns));
        }
    }

    #[test]
    fn test_not_greedy() {
        // Greedy would give row 0 column 0 (cost 1) and row 1 column 1 (cost 100)
        let costs = vec![vec![1.0, 2.0], vec![1.0, 100.0]];
        let assignment = solve_rect(&costs, 2).unwrap();

        assert_eq!(assignment, vec![1, 0]);
    }

    #[test]
    fn test_more_rows_than_columns() {
        let costs = vec![vec![1.0], vec![2.0]];
        assert!(solve_rect(&costs, 1).is_none());
    }

    #[test]
    fn test_empty() {
        assert_eq!(solve_rect(&[], 3), Some(Vec::new()));
    }

    #[test]
    fn test_negative_costs() {
        let costs = vec![vec![-5.0, 0.0], vec![0.0, -5.0]];
        assert_eq!(solve_rect(&costs, 2).unwrap(), vec![0, 1]);
    }
}
