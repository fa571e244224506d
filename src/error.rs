use thiserror::Error;

/// Input problems caught before any combination work begins.
///
/// These are caller errors, not system faults: the optimizer never starts
/// enumeration or GA search with invalid input.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("parcel list is empty")]
    EmptyParcelList,
    #[error("parcel count {0} outside supported range [2, 50]")]
    ParcelCountOutOfRange(usize),
    #[error("parcel '{id}' has non-positive area {area_sqm}")]
    NonPositiveArea { id: String, area_sqm: f64 },
    #[error("parcel '{id}' has non-positive price {price_per_sqm}")]
    NonPositivePrice { id: String, price_per_sqm: f64 },
    #[error("parcel '{id}' has negative max_far {max_far}")]
    NegativeFar { id: String, max_far: f64 },
    #[error("parcel '{id}': {attribute} {value} outside [0, 1]")]
    AttributeOutOfRange {
        id: String,
        attribute: &'static str,
        value: f64,
    },
    #[error("duplicate parcel id '{0}'")]
    DuplicateParcelId(String),
    #[error("max_parcels_in_combination {0} outside supported range [2, 10]")]
    CombinationSizeOutOfRange(usize),
    #[error("target area range [{min}, {max}] is invalid")]
    InvalidAreaRange { min: f64, max: f64 },
    #[error("score weights sum to {0}, expected 1.0")]
    WeightsNotNormalized(f64),
    #[error("genetic algorithm needs at least 2 parcels, got {0}")]
    TooFewParcels(usize),
}
