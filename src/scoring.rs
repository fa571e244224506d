//! Five-dimension combination scoring.
//!
//! Every sub-score and the weighted total are clamped to [0, 100]. The
//! engine is stateless and deterministic: scoring the same combination
//! twice yields identical values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combine::{multi_parcel_far_bonus, Combination};
use crate::error::ValidationError;
use crate::parcel::Parcel;

/// Ideal floor of the target band: combinations of 1000-2000 sqm score 100.
const AREA_IDEAL_MIN: f64 = 1000.0;
const AREA_IDEAL_MAX: f64 = 2000.0;
const AREA_RAMP_MIN: f64 = 800.0;
const AREA_RAMP_MAX: f64 = 2500.0;
const AREA_MIDPOINT: f64 = 1500.0;

/// Unit cost ceiling in won per square metre.
const COST_CEILING: f64 = 15_000_000.0;

/// FAR percentage at which the FAR score saturates.
const FAR_CEILING: f64 = 300.0;

/// Fixed scoring weights. Immutable once constructed; passed into the
/// engine rather than shared as mutable global state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub area: f64,
    pub far: f64,
    pub cost: f64,
    pub shape: f64,
    pub synergy: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            area: 0.25,
            far: 0.25,
            cost: 0.20,
            shape: 0.15,
            synergy: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let sum = self.area + self.far + self.cost + self.shape + self.synergy;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ValidationError::WeightsNotNormalized(sum));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinationScore {
    pub area_score: f64,
    pub far_score: f64,
    pub cost_score: f64,
    pub shape_score: f64,
    pub synergy_score: f64,
    pub total_score: f64,
}

impl CombinationScore {
    /// Sub-scores in a fixed order for dominance comparison.
    pub fn dimensions(&self) -> [f64; 5] {
        [
            self.area_score,
            self.far_score,
            self.cost_score,
            self.shape_score,
            self.synergy_score,
        ]
    }
}

pub(crate) fn clamp_score(v: f64) -> f64 {
    v.max(0.0).min(100.0)
}

pub struct ScoringEngine<'a> {
    weights: ScoreWeights,
    /// Member lookup for shape/synergy attributes.
    by_id: HashMap<&'a str, &'a Parcel>,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(weights: ScoreWeights, parcels: &'a [Parcel]) -> Self {
        Self {
            weights,
            by_id: parcels.iter().map(|p| (p.id.as_str(), p)).collect(),
        }
    }

    pub fn score(&self, combo: &Combination) -> CombinationScore {
        let members: Vec<&Parcel> = combo
            .parcel_ids
            .iter()
            .filter_map(|id| self.by_id.get(id.as_str()).copied())
            .collect();

        let area_score = clamp_score(area_score(combo.total_area));
        let far_score = clamp_score(combo.combined_far / FAR_CEILING * 100.0);
        let cost_score = clamp_score(cost_score(combo.average_price_per_sqm));
        let shape_score = clamp_score(shape_score(&members));
        let synergy_score = clamp_score(synergy_score(&members));

        let total_score = clamp_score(
            area_score * self.weights.area
                + far_score * self.weights.far
                + cost_score * self.weights.cost
                + shape_score * self.weights.shape
                + synergy_score * self.weights.synergy,
        );

        CombinationScore {
            area_score,
            far_score,
            cost_score,
            shape_score,
            synergy_score,
            total_score,
        }
    }
}

fn area_score(total_area: f64) -> f64 {
    if (AREA_IDEAL_MIN..=AREA_IDEAL_MAX).contains(&total_area) {
        100.0
    } else if (AREA_RAMP_MIN..AREA_IDEAL_MIN).contains(&total_area) {
        // 80 at 800 sqm ramping up to 100 at 1000 sqm.
        80.0 + (total_area - AREA_RAMP_MIN) / (AREA_IDEAL_MIN - AREA_RAMP_MIN) * 20.0
    } else if total_area > AREA_IDEAL_MAX && total_area <= AREA_RAMP_MAX {
        // 100 at 2000 sqm ramping down to 80 at 2500 sqm.
        100.0 - (total_area - AREA_IDEAL_MAX) / (AREA_RAMP_MAX - AREA_IDEAL_MAX) * 20.0
    } else {
        (60.0 - (total_area - AREA_MIDPOINT).abs() / AREA_MIDPOINT * 60.0).max(0.0)
    }
}

pub(crate) fn cost_score(unit_cost: f64) -> f64 {
    if unit_cost <= COST_CEILING {
        100.0 - unit_cost / COST_CEILING * 50.0
    } else {
        // Symmetric penalty slope below 50 once the ceiling is exceeded.
        50.0 - (unit_cost / COST_CEILING - 1.0) * 50.0
    }
}

fn shape_score(members: &[&Parcel]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let avg: f64 =
        members.iter().map(|p| p.shape_regularity).sum::<f64>() / members.len() as f64;
    let bonus = match members.len() {
        0 | 1 => 0.0,
        2 => 0.15,
        _ => 0.30,
    };
    (avg + bonus).min(1.0) * 100.0
}

fn synergy_score(members: &[&Parcel]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let n = members.len();
    let count_bonus = (10.0 * n as f64).min(30.0);
    let far_bonus = multi_parcel_far_bonus(n) * 1.5;
    let avg_access: f64 =
        members.iter().map(|p| p.accessibility).sum::<f64>() / n as f64;
    let avg_difficulty: f64 =
        members.iter().map(|p| p.development_difficulty).sum::<f64>() / n as f64;

    count_bonus + far_bonus + avg_access * 20.0 + (1.0 - avg_difficulty) * 20.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::test_parcel;

    fn score_of(areas: &[f64]) -> CombinationScore {
        let parcels: Vec<Parcel> = areas
            .iter()
            .enumerate()
            .map(|(i, a)| test_parcel(&format!("p{i}"), *a, 3_000_000.0))
            .collect();
        let engine = ScoringEngine::new(ScoreWeights::default(), &parcels);
        let members: Vec<&Parcel> = parcels.iter().collect();
        let combo = Combination::from_parcels(&members);
        engine.score(&combo)
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(ScoreWeights::default().validate().is_ok());
    }

    #[test]
    fn test_bad_weights_rejected() {
        let w = ScoreWeights {
            area: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            w.validate(),
            Err(ValidationError::WeightsNotNormalized(_))
        ));
    }

    #[test]
    fn test_area_score_piecewise() {
        assert_eq!(area_score(1000.0), 100.0);
        assert_eq!(area_score(2000.0), 100.0);
        assert_eq!(area_score(1500.0), 100.0);
        assert!((area_score(800.0) - 80.0).abs() < 1e-9);
        assert!((area_score(900.0) - 90.0).abs() < 1e-9);
        assert!((area_score(2500.0) - 80.0).abs() < 1e-9);
        assert!((area_score(2250.0) - 90.0).abs() < 1e-9);
        // Outside both ramps: distance-to-midpoint falloff.
        assert!((area_score(750.0) - 30.0).abs() < 1e-9);
        assert_eq!(area_score(4000.0), 0.0);
    }

    #[test]
    fn test_cost_score_around_ceiling() {
        assert!((cost_score(0.0) - 100.0).abs() < 1e-9);
        assert!((cost_score(COST_CEILING) - 50.0).abs() < 1e-9);
        assert!((cost_score(COST_CEILING * 1.5) - 25.0).abs() < 1e-9);
        // Beyond twice the ceiling the clamp in score() floors it at 0.
        assert!(cost_score(COST_CEILING * 3.0) < 0.0);
    }

    #[test]
    fn test_all_scores_within_bounds() {
        for areas in [
            vec![100.0],
            vec![500.0, 600.0],
            vec![400.0, 500.0, 600.0],
            vec![5000.0, 8000.0],
        ] {
            let s = score_of(&areas);
            for v in s.dimensions() {
                assert!((0.0..=100.0).contains(&v), "sub-score {v} out of bounds");
            }
            assert!((0.0..=100.0).contains(&s.total_score));
        }
    }

    #[test]
    fn test_shape_bonus_capped() {
        let mut parcels = vec![
            test_parcel("a", 500.0, 3_000_000.0),
            test_parcel("b", 500.0, 3_000_000.0),
            test_parcel("c", 500.0, 3_000_000.0),
        ];
        for p in &mut parcels {
            p.shape_regularity = 0.9;
        }
        let members: Vec<&Parcel> = parcels.iter().collect();
        // 0.9 + 0.30 caps at 1.0.
        assert!((shape_score(&members) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_synergy_rewards_merging() {
        let single = score_of(&[1500.0]);
        let triple = score_of(&[500.0, 500.0, 500.0]);
        assert!(triple.synergy_score > single.synergy_score);
        assert!(triple.synergy_score <= 100.0);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let parcels = vec![
            test_parcel("a", 500.0, 3_000_000.0),
            test_parcel("b", 600.0, 3_500_000.0),
        ];
        let engine = ScoringEngine::new(ScoreWeights::default(), &parcels);
        let members: Vec<&Parcel> = parcels.iter().collect();
        let combo = Combination::from_parcels(&members);

        let first = engine.score(&combo);
        let second = engine.score(&combo);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_is_weighted_sum() {
        let s = score_of(&[500.0, 600.0]);
        let w = ScoreWeights::default();
        let expected = s.area_score * w.area
            + s.far_score * w.far
            + s.cost_score * w.cost
            + s.shape_score * w.shape
            + s.synergy_score * w.synergy;
        assert!((s.total_score - expected).abs() < 1e-9);
    }
}
