use serde::Serialize;

use crate::combine::Combination;
use crate::scoring::CombinationScore;

/// A combination with its score and Pareto annotation. The annotation only
/// has meaning relative to the set it was computed over.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCombination {
    #[serde(flatten)]
    pub combination: Combination,
    pub score: CombinationScore,
    pub is_pareto_optimal: bool,
    /// Ids of combinations that dominate this one. Empty iff optimal.
    pub dominated_by: Vec<String>,
    /// 1-based position after ranking; 0 until assigned.
    pub rank: usize,
}

impl ScoredCombination {
    pub fn new(combination: Combination, score: CombinationScore) -> Self {
        Self {
            combination,
            score,
            is_pareto_optimal: false,
            dominated_by: Vec::new(),
            rank: 0,
        }
    }
}

/// True when `a` weakly dominates `b` and strictly exceeds it in at least
/// one of the five sub-scores.
pub fn dominates(a: &CombinationScore, b: &CombinationScore) -> bool {
    let mut strictly_better = false;
    for (va, vb) in a.dimensions().iter().zip(b.dimensions().iter()) {
        if va < vb {
            return false;
        }
        if va > vb {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Annotate every combination with its Pareto status. O(n^2) over the set,
/// acceptable because n is bounded by the generation cap. Every dominated
/// combination records the ids dominating it for explainability.
pub fn annotate_pareto(combos: &mut [ScoredCombination]) {
    let n = combos.len();
    for i in 0..n {
        let mut dominated_by = Vec::new();
        for j in 0..n {
            if i != j && dominates(&combos[j].score, &combos[i].score) {
                dominated_by.push(combos[j].combination.id.clone());
            }
        }
        combos[i].is_pareto_optimal = dominated_by.is_empty();
        combos[i].dominated_by = dominated_by;
    }
}
