use itertools::Itertools;
use serde::Serialize;

use crate::parcel::{haversine_km, Parcel};

/// FAR bonus in percentage points granted when parcels are merged. Larger
/// consolidated sites qualify for regulatory incentives.
pub fn multi_parcel_far_bonus(n_parcels: usize) -> f64 {
    match n_parcels {
        0 | 1 => 0.0,
        2 => 10.0,
        _ => 20.0,
    }
}

/// Won per "eok" (hundred million won), the unit total costs are reported in.
pub const EOK_WON: f64 = 100_000_000.0;

/// A candidate merge of one or more parcels with derived aggregates.
///
/// Member ids are kept sorted and deduplicated, and `id` is their
/// underscore-joined concatenation, so the identity of a combination does
/// not depend on input order.
#[derive(Debug, Clone, Serialize)]
pub struct Combination {
    pub id: String,
    pub parcel_ids: Vec<String>,
    /// Summed member area in square metres.
    pub total_area: f64,
    /// Mean of member `max_far`, percent.
    pub avg_far: f64,
    /// `avg_far` plus the multi-parcel bonus.
    pub combined_far: f64,
    /// Summed acquisition cost in hundred-million-won units.
    pub total_cost: f64,
    /// Raw cost divided by total area; 0 when the area is 0.
    pub average_price_per_sqm: f64,
}

impl Combination {
    pub fn from_parcels(members: &[&Parcel]) -> Self {
        let mut parcel_ids: Vec<String> = members.iter().map(|p| p.id.clone()).collect();
        parcel_ids.sort();
        parcel_ids.dedup();

        let total_area: f64 = members.iter().map(|p| p.area_sqm).sum();
        let avg_far = if members.is_empty() {
            0.0
        } else {
            members.iter().map(|p| p.max_far).sum::<f64>() / members.len() as f64
        };
        let raw_cost: f64 = members.iter().map(|p| p.cost()).sum();
        let average_price_per_sqm = if total_area > 0.0 {
            raw_cost / total_area
        } else {
            0.0
        };

        Self {
            id: parcel_ids.join("_"),
            combined_far: avg_far + multi_parcel_far_bonus(members.len()),
            parcel_ids,
            total_area,
            avg_far,
            total_cost: raw_cost / EOK_WON,
            average_price_per_sqm,
        }
    }

    pub fn parcel_count(&self) -> usize {
        self.parcel_ids.len()
    }
}

/// Constraints for exhaustive subset enumeration.
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub target_area_min: f64,
    pub target_area_max: f64,
    /// Largest subset size to enumerate, at most 10.
    pub max_parcels_in_combo: usize,
    /// Hard cap on results. Generation keeps the first `max_combinations`
    /// subsets found and stops; this is first-found truncation, not a
    /// best-N selection, and smaller subset sizes can starve larger ones.
    pub max_combinations: usize,
    /// Maximum pairwise distance between members in kilometres.
    pub distance_threshold_km: f64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            target_area_min: 1000.0,
            target_area_max: 2000.0,
            max_parcels_in_combo: 5,
            max_combinations: 100,
            distance_threshold_km: 0.5,
        }
    }
}

/// Enumerate feasible parcel subsets in increasing subset size.
///
/// A subset is kept when its total area falls inside the target range and,
/// for sizes >= 2, every pairwise great-circle distance is within the
/// threshold. Returns an empty vector when nothing qualifies.
pub fn generate_combinations(parcels: &[Parcel], params: &GeneratorParams) -> Vec<Combination> {
    let mut out = Vec::new();
    let max_size = params.max_parcels_in_combo.min(parcels.len()).min(10);

    'sizes: for size in 1..=max_size {
        for members in parcels.iter().combinations(size) {
            let total_area: f64 = members.iter().map(|p| p.area_sqm).sum();
            if total_area < params.target_area_min || total_area > params.target_area_max {
                continue;
            }
            if size >= 2 && !all_within_distance(&members, params.distance_threshold_km) {
                continue;
            }

            out.push(Combination::from_parcels(&members));
            if out.len() >= params.max_combinations {
                break 'sizes;
            }
        }
    }

    out
}

fn all_within_distance(members: &[&Parcel], threshold_km: f64) -> bool {
    members
        .iter()
        .tuple_combinations()
        .all(|(a, b)| haversine_km(a, b) <= threshold_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::test_parcel;

    #[test]
    fn test_combination_id_is_order_independent() {
        let a = test_parcel("lot-b", 500.0, 3_000_000.0);
        let b = test_parcel("lot-a", 600.0, 3_500_000.0);

        let fwd = Combination::from_parcels(&[&a, &b]);
        let rev = Combination::from_parcels(&[&b, &a]);
        assert_eq!(fwd.id, "lot-a_lot-b");
        assert_eq!(fwd.id, rev.id);
        assert_eq!(fwd.parcel_ids, rev.parcel_ids);
    }

    #[test]
    fn test_combination_derived_fields() {
        let a = test_parcel("a", 500.0, 3_000_000.0);
        let b = test_parcel("b", 600.0, 3_500_000.0);
        let c = Combination::from_parcels(&[&a, &b]);

        assert_eq!(c.total_area, 1100.0);
        assert_eq!(c.avg_far, 200.0);
        assert_eq!(c.combined_far, 210.0); // +10 for a 2-parcel merge
        // 500*3.0M + 600*3.5M = 3.6 eok total
        assert!((c.total_cost - 36.0).abs() < 1e-9);
        let expected_avg = (500.0 * 3_000_000.0 + 600.0 * 3_500_000.0) / 1100.0;
        assert!((c.average_price_per_sqm - expected_avg).abs() < 1e-6);
    }

    #[test]
    fn test_far_bonus_by_count() {
        assert_eq!(multi_parcel_far_bonus(1), 0.0);
        assert_eq!(multi_parcel_far_bonus(2), 10.0);
        assert_eq!(multi_parcel_far_bonus(3), 20.0);
        assert_eq!(multi_parcel_far_bonus(7), 20.0);
    }

    #[test]
    fn test_generate_respects_area_range() {
        let parcels = vec![
            test_parcel("a", 500.0, 3_000_000.0),
            test_parcel("b", 600.0, 3_500_000.0),
            test_parcel("c", 2500.0, 2_000_000.0),
        ];
        let params = GeneratorParams::default();
        let combos = generate_combinations(&parcels, &params);

        assert!(!combos.is_empty());
        for c in &combos {
            assert!(c.total_area >= params.target_area_min);
            assert!(c.total_area <= params.target_area_max);
        }
        // "c" alone is 2500 sqm and over range with any partner.
        assert!(combos.iter().all(|c| !c.parcel_ids.contains(&"c".to_string())));
    }

    #[test]
    fn test_generate_filters_distant_parcels() {
        let a = test_parcel("a", 500.0, 3_000_000.0);
        let mut b = test_parcel("b", 600.0, 3_500_000.0);
        b.latitude += 0.02; // ~2.2 km away
        let combos = generate_combinations(&[a, b], &GeneratorParams::default());
        assert!(combos.iter().all(|c| c.parcel_count() == 1 || c.id != "a_b"));
        assert!(!combos.iter().any(|c| c.id == "a_b"));
    }

    #[test]
    fn test_generate_truncates_at_cap() {
        let parcels: Vec<_> = (0..12)
            .map(|i| test_parcel(&format!("p{i:02}"), 1200.0, 3_000_000.0))
            .collect();
        let params = GeneratorParams {
            max_combinations: 5,
            ..Default::default()
        };
        let combos = generate_combinations(&parcels, &params);
        assert_eq!(combos.len(), 5);
        // First-found semantics: all kept results are single parcels.
        assert!(combos.iter().all(|c| c.parcel_count() == 1));
    }

    #[test]
    fn test_generate_no_match_is_empty_not_error() {
        let parcels = vec![
            test_parcel("a", 100.0, 3_000_000.0),
            test_parcel("b", 120.0, 3_500_000.0),
        ];
        let combos = generate_combinations(&parcels, &GeneratorParams::default());
        assert!(combos.is_empty());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let parcels: Vec<_> = (0..8)
            .map(|i| test_parcel(&format!("p{i}"), 400.0 + 50.0 * i as f64, 3_000_000.0))
            .collect();
        let params = GeneratorParams::default();
        let first = generate_combinations(&parcels, &params);
        let second = generate_combinations(&parcels, &params);
        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.total_area, y.total_area);
        }
    }
}
