//! Exhaustive optimization pipeline.
//!
//! Generator -> Scoring Engine -> Pareto Analyzer -> Ranker, run over one
//! caller-owned parcel list. Fully synchronous and deterministic; nothing
//! survives the call beyond the returned result.

use serde::Serialize;

use crate::combine::{generate_combinations, GeneratorParams};
use crate::error::ValidationError;
use crate::parcel::{validate_parcels, Parcel};
use crate::pareto::{annotate_pareto, ScoredCombination};
use crate::rank::{rank_combinations, summarize, top_n, Summary};
use crate::scoring::{ScoreWeights, ScoringEngine};

/// Logical response of one optimization call.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub success: bool,
    pub total_parcels: usize,
    pub total_combinations_evaluated: usize,
    pub pareto_optimal_count: usize,
    /// The rank-1 combination, absent when nothing was feasible.
    pub optimal_combination: Option<ScoredCombination>,
    pub top_combinations: Vec<ScoredCombination>,
    pub summary: Summary,
    /// Explanation for empty result sets; empty-result is a successful
    /// response, not an error.
    pub message: Option<String>,
}

pub fn run_exhaustive(
    parcels: &[Parcel],
    params: &GeneratorParams,
    weights: ScoreWeights,
    top: usize,
) -> Result<OptimizationResult, ValidationError> {
    validate_parcels(parcels)?;
    weights.validate()?;
    if !(2..=10).contains(&params.max_parcels_in_combo) {
        return Err(ValidationError::CombinationSizeOutOfRange(
            params.max_parcels_in_combo,
        ));
    }
    if params.target_area_min <= 0.0 || params.target_area_min > params.target_area_max {
        return Err(ValidationError::InvalidAreaRange {
            min: params.target_area_min,
            max: params.target_area_max,
        });
    }

    let engine = ScoringEngine::new(weights, parcels);
    let mut scored: Vec<ScoredCombination> = generate_combinations(parcels, params)
        .into_iter()
        .map(|combo| {
            let score = engine.score(&combo);
            ScoredCombination::new(combo, score)
        })
        .collect();

    annotate_pareto(&mut scored);
    rank_combinations(&mut scored);

    let summary = summarize(&scored);
    let message = if scored.is_empty() {
        Some(format!(
            "no combination satisfies area range [{}, {}] sqm within {} km",
            params.target_area_min, params.target_area_max, params.distance_threshold_km
        ))
    } else {
        None
    };

    Ok(OptimizationResult {
        success: true,
        total_parcels: parcels.len(),
        total_combinations_evaluated: scored.len(),
        pareto_optimal_count: summary.pareto_optimal_count,
        optimal_combination: scored.first().cloned(),
        top_combinations: top_n(&scored, top),
        summary,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::test_parcel;

    fn params() -> GeneratorParams {
        GeneratorParams::default()
    }

    #[test]
    fn test_two_parcel_scenario() {
        // 500 + 600 sqm at 3.0M / 3.5M per sqm, target [1000, 2000]:
        // the merged pair is the unique candidate.
        let parcels = vec![
            test_parcel("a", 500.0, 3_000_000.0),
            test_parcel("b", 600.0, 3_500_000.0),
        ];
        let result =
            run_exhaustive(&parcels, &params(), ScoreWeights::default(), 10).unwrap();

        assert!(result.success);
        assert_eq!(result.total_parcels, 2);
        assert_eq!(result.total_combinations_evaluated, 1);
        assert_eq!(result.pareto_optimal_count, 1);

        let best = result.optimal_combination.unwrap();
        assert_eq!(best.combination.id, "a_b");
        assert_eq!(best.combination.total_area, 1100.0);
        assert_eq!(
            best.combination.combined_far,
            best.combination.avg_far + 10.0
        );
        assert!(best.is_pareto_optimal);
        assert_eq!(best.rank, 1);
    }

    #[test]
    fn test_empty_result_is_success_with_message() {
        let parcels = vec![
            test_parcel("a", 100.0, 3_000_000.0),
            test_parcel("b", 120.0, 3_500_000.0),
        ];
        let result =
            run_exhaustive(&parcels, &params(), ScoreWeights::default(), 10).unwrap();

        assert!(result.success);
        assert_eq!(result.total_combinations_evaluated, 0);
        assert!(result.optimal_combination.is_none());
        assert!(result.top_combinations.is_empty());
        assert!(result.message.is_some());
    }

    #[test]
    fn test_validation_runs_before_search() {
        let parcels = vec![test_parcel("a", 500.0, 3_000_000.0)];
        assert!(matches!(
            run_exhaustive(&parcels, &params(), ScoreWeights::default(), 10),
            Err(ValidationError::ParcelCountOutOfRange(1))
        ));

        let parcels = vec![
            test_parcel("a", 500.0, 3_000_000.0),
            test_parcel("b", 600.0, 3_500_000.0),
        ];
        let bad = GeneratorParams {
            max_parcels_in_combo: 1,
            ..params()
        };
        assert!(matches!(
            run_exhaustive(&parcels, &bad, ScoreWeights::default(), 10),
            Err(ValidationError::CombinationSizeOutOfRange(1))
        ));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let parcels: Vec<Parcel> = (0..10)
            .map(|i| {
                let mut p = test_parcel(
                    &format!("p{i}"),
                    300.0 + 90.0 * i as f64,
                    2_800_000.0 + 50_000.0 * i as f64,
                );
                (p.latitude, p.longitude) = Parcel::synthesized_coords(i);
                p
            })
            .collect();

        let a = run_exhaustive(&parcels, &params(), ScoreWeights::default(), 10).unwrap();
        let b = run_exhaustive(&parcels, &params(), ScoreWeights::default(), 10).unwrap();

        assert_eq!(
            a.total_combinations_evaluated,
            b.total_combinations_evaluated
        );
        for (x, y) in a.top_combinations.iter().zip(b.top_combinations.iter()) {
            assert_eq!(x.combination.id, y.combination.id);
            assert_eq!(x.rank, y.rank);
            assert_eq!(x.score, y.score);
            assert_eq!(x.is_pareto_optimal, y.is_pareto_optimal);
        }
    }

    #[test]
    fn test_area_invariant_and_score_bounds() {
        let parcels: Vec<Parcel> = (0..10)
            .map(|i| {
                let mut p = test_parcel(
                    &format!("p{i}"),
                    250.0 + 130.0 * i as f64,
                    2_500_000.0 + 200_000.0 * (i % 4) as f64,
                );
                (p.latitude, p.longitude) = Parcel::synthesized_coords(i);
                p
            })
            .collect();

        let p = params();
        let result = run_exhaustive(&parcels, &p, ScoreWeights::default(), 100).unwrap();

        assert!(result.total_combinations_evaluated > 0);
        for c in &result.top_combinations {
            assert!(c.combination.total_area >= p.target_area_min);
            assert!(c.combination.total_area <= p.target_area_max);
            for v in c.score.dimensions() {
                assert!((0.0..=100.0).contains(&v));
            }
            assert!((0.0..=100.0).contains(&c.score.total_score));
            // Completeness: non-optimal entries name a dominator.
            if !c.is_pareto_optimal {
                assert!(!c.dominated_by.is_empty());
            }
        }
    }
}
