use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Mean Earth radius in kilometres, used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fallback origin for parcels supplied without coordinates.
const DEFAULT_LAT: f64 = 37.5665;
const DEFAULT_LON: f64 = 126.9780;

/// One candidate parcel. Immutable once constructed; the caller owns the
/// parcel list for the duration of a single optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parcel {
    pub id: String,
    /// Lot area in square metres. Always > 0.
    pub area_sqm: f64,
    /// Maximum floor area ratio as a percentage (e.g. 200.0 = 200%).
    pub max_far: f64,
    /// Asking price per square metre in won.
    pub price_per_sqm: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// How close the lot shape is to a regular rectangle, in [0, 1].
    pub shape_regularity: f64,
    /// Road/transit access quality, in [0, 1].
    pub accessibility: f64,
    /// Expected construction difficulty (slope, soil, tenants), in [0, 1].
    pub development_difficulty: f64,
}

impl Parcel {
    /// Total acquisition cost of this parcel in won.
    pub fn cost(&self) -> f64 {
        self.area_sqm * self.price_per_sqm
    }

    /// Synthesize deterministic coordinates for the parcel at input
    /// position `index`. A 0.0001 degree step is roughly 11 m, so
    /// coordinate-less parcel sets stay inside the default 0.5 km
    /// adjacency threshold.
    pub fn synthesized_coords(index: usize) -> (f64, f64) {
        let step = 0.0001 * index as f64;
        (DEFAULT_LAT + step, DEFAULT_LON + step)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.area_sqm <= 0.0 {
            return Err(ValidationError::NonPositiveArea {
                id: self.id.clone(),
                area_sqm: self.area_sqm,
            });
        }
        if self.price_per_sqm <= 0.0 {
            return Err(ValidationError::NonPositivePrice {
                id: self.id.clone(),
                price_per_sqm: self.price_per_sqm,
            });
        }
        if self.max_far < 0.0 {
            return Err(ValidationError::NegativeFar {
                id: self.id.clone(),
                max_far: self.max_far,
            });
        }
        for (attribute, value) in [
            ("shape_regularity", self.shape_regularity),
            ("accessibility", self.accessibility),
            ("development_difficulty", self.development_difficulty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::AttributeOutOfRange {
                    id: self.id.clone(),
                    attribute,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Validate a full parcel list before any computation begins.
pub fn validate_parcels(parcels: &[Parcel]) -> Result<(), ValidationError> {
    if parcels.is_empty() {
        return Err(ValidationError::EmptyParcelList);
    }
    if !(2..=50).contains(&parcels.len()) {
        return Err(ValidationError::ParcelCountOutOfRange(parcels.len()));
    }
    for (i, p) in parcels.iter().enumerate() {
        p.validate()?;
        if parcels[..i].iter().any(|q| q.id == p.id) {
            return Err(ValidationError::DuplicateParcelId(p.id.clone()));
        }
    }
    Ok(())
}

/// Great-circle distance between two parcels in kilometres (Haversine).
pub fn haversine_km(a: &Parcel, b: &Parcel) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Shared test fixture: a co-located parcel with midline attributes.
#[cfg(test)]
pub fn test_parcel(id: &str, area_sqm: f64, price_per_sqm: f64) -> Parcel {
    Parcel {
        id: id.to_string(),
        area_sqm,
        max_far: 200.0,
        price_per_sqm,
        latitude: DEFAULT_LAT,
        longitude: DEFAULT_LON,
        shape_regularity: 0.7,
        accessibility: 0.7,
        development_difficulty: 0.3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        let a = test_parcel("a", 500.0, 3_000_000.0);
        let b = test_parcel("b", 600.0, 3_500_000.0);
        assert!(haversine_km(&a, &b) < 1e-9);
    }

    #[test]
    fn test_haversine_known_offset() {
        let a = test_parcel("a", 500.0, 3_000_000.0);
        let mut b = test_parcel("b", 600.0, 3_500_000.0);
        // One degree of latitude is ~111.2 km.
        b.latitude += 1.0;
        let d = haversine_km(&a, &b);
        assert!((d - 111.2).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_synthesized_coords_within_threshold() {
        let mut a = test_parcel("a", 500.0, 3_000_000.0);
        let mut b = test_parcel("b", 600.0, 3_500_000.0);
        (a.latitude, a.longitude) = Parcel::synthesized_coords(0);
        (b.latitude, b.longitude) = Parcel::synthesized_coords(19);
        assert!(haversine_km(&a, &b) < 0.5);
    }

    #[test]
    fn test_validate_rejects_bad_parcels() {
        let mut p = test_parcel("a", 500.0, 3_000_000.0);
        p.area_sqm = 0.0;
        assert!(matches!(
            p.validate(),
            Err(ValidationError::NonPositiveArea { .. })
        ));

        let mut p = test_parcel("a", 500.0, 3_000_000.0);
        p.price_per_sqm = -1.0;
        assert!(matches!(
            p.validate(),
            Err(ValidationError::NonPositivePrice { .. })
        ));

        let mut p = test_parcel("a", 500.0, 3_000_000.0);
        p.accessibility = 1.2;
        assert!(matches!(
            p.validate(),
            Err(ValidationError::AttributeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_parcels_count_bounds() {
        assert_eq!(
            validate_parcels(&[]),
            Err(ValidationError::EmptyParcelList)
        );

        let one = vec![test_parcel("a", 500.0, 3_000_000.0)];
        assert_eq!(
            validate_parcels(&one),
            Err(ValidationError::ParcelCountOutOfRange(1))
        );

        let many: Vec<Parcel> = (0..51)
            .map(|i| test_parcel(&format!("p{i}"), 500.0, 3_000_000.0))
            .collect();
        assert_eq!(
            validate_parcels(&many),
            Err(ValidationError::ParcelCountOutOfRange(51))
        );
    }

    #[test]
    fn test_validate_parcels_duplicate_id() {
        let parcels = vec![
            test_parcel("a", 500.0, 3_000_000.0),
            test_parcel("a", 600.0, 3_500_000.0),
        ];
        assert_eq!(
            validate_parcels(&parcels),
            Err(ValidationError::DuplicateParcelId("a".to_string()))
        );
    }
}
