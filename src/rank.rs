use serde::Serialize;

use crate::pareto::ScoredCombination;

/// Aggregate statistics over one evaluated combination set.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub combinations_evaluated: usize,
    pub pareto_optimal_count: usize,
    pub pareto_ratio: f64,
    pub average_score: f64,
    pub best_score: f64,
    pub single_parcel_count: usize,
    pub multi_parcel_count: usize,
}

/// Sort by total score descending (stable, ties keep enumeration order)
/// and assign 1-based ranks.
pub fn rank_combinations(combos: &mut Vec<ScoredCombination>) {
    combos.sort_by(|a, b| b.score.total_score.total_cmp(&a.score.total_score));
    for (i, c) in combos.iter_mut().enumerate() {
        c.rank = i + 1;
    }
}

/// The top-N slice of an already ranked set.
pub fn top_n(combos: &[ScoredCombination], n: usize) -> Vec<ScoredCombination> {
    combos.iter().take(n).cloned().collect()
}

/// Summary statistics. Empty sets yield zeroed statistics rather than
/// dividing by zero.
pub fn summarize(combos: &[ScoredCombination]) -> Summary {
    let n = combos.len();
    if n == 0 {
        return Summary {
            combinations_evaluated: 0,
            pareto_optimal_count: 0,
            pareto_ratio: 0.0,
            average_score: 0.0,
            best_score: 0.0,
            single_parcel_count: 0,
            multi_parcel_count: 0,
        };
    }

    let pareto_optimal_count = combos.iter().filter(|c| c.is_pareto_optimal).count();
    let total: f64 = combos.iter().map(|c| c.score.total_score).sum();
    let best = combos
        .iter()
        .map(|c| c.score.total_score)
        .fold(f64::NEG_INFINITY, f64::max);
    let single = combos
        .iter()
        .filter(|c| c.combination.parcel_count() == 1)
        .count();

    Summary {
        combinations_evaluated: n,
        pareto_optimal_count,
        pareto_ratio: pareto_optimal_count as f64 / n as f64,
        average_score: total / n as f64,
        best_score: best,
        single_parcel_count: single,
        multi_parcel_count: n - single,
    }
}
