use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::genetic::GaConfig;
use crate::parcel::{validate_parcels, Parcel};
use crate::scoring::ScoreWeights;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Root {
    pub project: Project,
    pub parcels: Vec<ParcelSpec>,
    pub search: Search,
    pub weights: Option<ScoreWeights>,
    pub genetic: Option<Genetic>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub name: String,
    pub version: String,
}

/// One parcel as written in the config file. Optional attributes fall back
/// to midline defaults; missing coordinates are synthesized from the
/// parcel's position in the file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParcelSpec {
    pub id: String,
    pub area_sqm: f64,
    pub max_far: f64,
    pub price_per_sqm: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default = "default_shape_regularity")]
    pub shape_regularity: f64,
    #[serde(default = "default_accessibility")]
    pub accessibility: f64,
    #[serde(default = "default_difficulty")]
    pub development_difficulty: f64,
}

fn default_shape_regularity() -> f64 { 0.7 }
fn default_accessibility() -> f64 { 0.7 }
fn default_difficulty() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Search {
    pub target_area_min: f64,
    pub target_area_max: f64,
    #[serde(default = "default_max_parcels")]
    pub max_parcels_in_combination: usize,
    #[serde(default = "default_max_combinations")]
    pub max_combinations: usize,
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold_km: f64,
}

fn default_max_parcels() -> usize { 5 }
fn default_max_combinations() -> usize { 100 }
fn default_distance_threshold() -> f64 { 0.5 }

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Genetic {
    #[serde(default = "default_pop_size")]
    pub pop_size: usize,
    #[serde(default = "default_generations")]
    pub generations: usize,
    #[serde(default = "default_crossover_prob")]
    pub crossover_prob: f64,
    #[serde(default = "default_mutation_prob")]
    pub mutation_prob: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_pop_size() -> usize { 50 }
fn default_generations() -> usize { 50 }
fn default_crossover_prob() -> f64 { 0.8 }
fn default_mutation_prob() -> f64 { 0.1 }
fn default_seed() -> u64 { 42 }

impl Genetic {
    pub fn to_ga_config(&self) -> GaConfig {
        GaConfig {
            pop_size: self.pop_size,
            generations: self.generations,
            crossover_prob: self.crossover_prob,
            mutation_prob: self.mutation_prob,
            seed: self.seed,
            ..GaConfig::default()
        }
    }
}

impl Root {
    /// Materialize owned parcels, synthesizing coordinates for entries
    /// that do not carry any.
    pub fn to_parcels(&self) -> Vec<Parcel> {
        self.parcels
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let (lat, lon) = match (spec.latitude, spec.longitude) {
                    (Some(lat), Some(lon)) => (lat, lon),
                    _ => Parcel::synthesized_coords(i),
                };
                Parcel {
                    id: spec.id.clone(),
                    area_sqm: spec.area_sqm,
                    max_far: spec.max_far,
                    price_per_sqm: spec.price_per_sqm,
                    latitude: lat,
                    longitude: lon,
                    shape_regularity: spec.shape_regularity,
                    accessibility: spec.accessibility,
                    development_difficulty: spec.development_difficulty,
                }
            })
            .collect()
    }

    pub fn score_weights(&self) -> ScoreWeights {
        self.weights.unwrap_or_default()
    }

    /// Request-level validation, surfaced before any computation begins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parcels(&self.to_parcels())?;
        self.score_weights().validate()?;

        let s = &self.search;
        if !(2..=10).contains(&s.max_parcels_in_combination) {
            return Err(ValidationError::CombinationSizeOutOfRange(
                s.max_parcels_in_combination,
            ));
        }
        if s.target_area_min <= 0.0 || s.target_area_min > s.target_area_max {
            return Err(ValidationError::InvalidAreaRange {
                min: s.target_area_min,
                max: s.target_area_max,
            });
        }
        Ok(())
    }

    /// Config-file sanity checks on top of the request-level taxonomy.
    pub fn validate_file(&self) -> Result<()> {
        if self.project.name.is_empty() {
            bail!("project.name must not be empty");
        }
        if self.search.max_combinations == 0 {
            bail!("search.max_combinations must be >= 1");
        }
        if self.search.distance_threshold_km <= 0.0 {
            bail!("search.distance_threshold_km must be positive");
        }
        if let Some(ref g) = self.genetic {
            if g.pop_size < 2 {
                bail!("genetic.pop_size must be >= 2");
            }
            if g.generations == 0 {
                bail!("genetic.generations must be >= 1");
            }
            if !(0.0..=1.0).contains(&g.crossover_prob) {
                bail!("genetic.crossover_prob must be in [0, 1]");
            }
            if !(0.0..=1.0).contains(&g.mutation_prob) {
                bail!("genetic.mutation_prob must be in [0, 1]");
            }
        }
        self.validate()?;
        Ok(())
    }
}
