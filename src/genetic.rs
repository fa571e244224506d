//! Genetic-algorithm fallback for large parcel sets.
//!
//! Exhaustive enumeration is infeasible once parcel counts reach the high
//! teens, so this module searches parcel-selection bitstrings instead: one
//! gene per candidate parcel, 1 = included in the merge. Single-objective
//! weighted fitness, tournament selection, single-point crossover and
//! one-bit mutation. This path is a best-effort heuristic substitute and
//! does not compute Pareto optimality.

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::combine::Combination;
use crate::error::ValidationError;
use crate::parcel::Parcel;
use crate::scoring::{clamp_score, cost_score};

/// Fitness term weights: area fit, FAR, cost efficiency, count penalty.
const W_AREA: f64 = 0.35;
const W_FAR: f64 = 0.30;
const W_COST: f64 = 0.25;
const W_COUNT: f64 = 0.10;

const FAR_CEILING: f64 = 300.0;

/// GA tuning knobs. `seed` makes every run reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    pub pop_size: usize,
    pub generations: usize,
    /// Probability of single-point crossover per offspring pair.
    pub crossover_prob: f64,
    /// Probability of flipping exactly one random bit per child.
    pub mutation_prob: f64,
    pub tournament_size: usize,
    /// Stop early after this many consecutive generations with an
    /// identical best fitness.
    pub plateau_window: usize,
    pub seed: u64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            pop_size: 50,
            generations: 50,
            crossover_prob: 0.8,
            mutation_prob: 0.1,
            tournament_size: 3,
            plateau_window: 10,
            seed: 42,
        }
    }
}

/// One selection bitstring with its cached fitness.
#[derive(Debug, Clone)]
struct Individual {
    genes: Vec<bool>,
    fitness: f64,
}

/// Combination-like summary of a surviving chromosome.
#[derive(Debug, Clone, Serialize)]
pub struct GaSolution {
    pub parcel_ids: Vec<String>,
    pub total_area: f64,
    pub estimated_far: f64,
    /// Estimated acquisition cost in hundred-million-won units.
    pub estimated_cost: f64,
    pub fitness: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaResult {
    /// Top distinct chromosomes by final fitness, at most 10.
    pub solutions: Vec<GaSolution>,
    /// Best fitness per generation. Non-decreasing because the best
    /// individual survives each generation unchanged.
    pub best_fitness_history: Vec<f64>,
    pub generations_run: usize,
}

pub struct GeneticOptimizer<'a> {
    config: GaConfig,
    parcels: &'a [Parcel],
    target_area_min: f64,
    target_area_max: f64,
    rng: SmallRng,
}

impl<'a> GeneticOptimizer<'a> {
    pub fn new(
        parcels: &'a [Parcel],
        target_area_min: f64,
        target_area_max: f64,
        config: GaConfig,
    ) -> Result<Self, ValidationError> {
        if parcels.len() < 2 {
            return Err(ValidationError::TooFewParcels(parcels.len()));
        }
        Ok(Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            parcels,
            target_area_min,
            target_area_max,
        })
    }

    pub fn run(mut self) -> GaResult {
        let mut population = self.initialize();
        let mut history: Vec<f64> = Vec::with_capacity(self.config.generations);
        let mut plateau = 0usize;

        for _gen in 0..self.config.generations {
            let best = population
                .iter()
                .map(|ind| ind.fitness)
                .fold(f64::NEG_INFINITY, f64::max);

            if history.last() == Some(&best) {
                plateau += 1;
            } else {
                plateau = 0;
            }
            history.push(best);
            if plateau + 1 >= self.config.plateau_window {
                break;
            }

            population = self.next_generation(&population);
        }

        let generations_run = history.len();
        GaResult {
            solutions: self.top_solutions(population),
            best_fitness_history: history,
            generations_run,
        }
    }

    fn initialize(&mut self) -> Vec<Individual> {
        let n = self.parcels.len();
        (0..self.config.pop_size)
            .map(|_| {
                let mut genes: Vec<bool> = (0..n).map(|_| self.rng.gen_bool(0.5)).collect();
                self.repair(&mut genes);
                self.make_individual(genes)
            })
            .collect()
    }

    /// Drop random selected genes until the total area fits under the
    /// target maximum; force one random gene on if nothing is selected.
    fn repair(&mut self, genes: &mut [bool]) {
        loop {
            let selected: Vec<usize> = (0..genes.len()).filter(|&i| genes[i]).collect();
            if selected.is_empty() {
                let i = self.rng.gen_range(0..genes.len());
                genes[i] = true;
                return;
            }
            let total: f64 = selected.iter().map(|&i| self.parcels[i].area_sqm).sum();
            if total <= self.target_area_max || selected.len() == 1 {
                return;
            }
            let drop = selected[self.rng.gen_range(0..selected.len())];
            genes[drop] = false;
        }
    }

    fn make_individual(&self, genes: Vec<bool>) -> Individual {
        let fitness = self.fitness(&genes);
        Individual { genes, fitness }
    }

    fn fitness(&self, genes: &[bool]) -> f64 {
        let members: Vec<&Parcel> = genes
            .iter()
            .zip(self.parcels.iter())
            .filter_map(|(on, p)| on.then_some(p))
            .collect();
        if members.is_empty() {
            return 0.0;
        }
        let combo = Combination::from_parcels(&members);

        let area_fit = clamp_score(self.area_fit(combo.total_area));
        let far_term = clamp_score(combo.combined_far / FAR_CEILING * 100.0);
        let cost_term = clamp_score(cost_score(combo.average_price_per_sqm));
        let count_penalty =
            clamp_score(100.0 - 20.0 * (members.len().saturating_sub(2)) as f64);

        area_fit * W_AREA + far_term * W_FAR + cost_term * W_COST + count_penalty * W_COUNT
    }

    fn area_fit(&self, total_area: f64) -> f64 {
        if (self.target_area_min..=self.target_area_max).contains(&total_area) {
            100.0
        } else if total_area < self.target_area_min {
            100.0 * (1.0 - (self.target_area_min - total_area) / self.target_area_min)
        } else {
            100.0 * (1.0 - (total_area - self.target_area_max) / self.target_area_max)
        }
    }

    fn tournament_select<'p>(&mut self, population: &'p [Individual]) -> &'p Individual {
        let mut best: &Individual = &population[self.rng.gen_range(0..population.len())];
        for _ in 1..self.config.tournament_size {
            let challenger = &population[self.rng.gen_range(0..population.len())];
            if challenger.fitness > best.fitness {
                best = challenger;
            }
        }
        best
    }

    fn next_generation(&mut self, population: &[Individual]) -> Vec<Individual> {
        let mut next = Vec::with_capacity(self.config.pop_size);

        // Elitism: the current best survives unchanged.
        if let Some(elite) = population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        {
            next.push(elite.clone());
        }

        while next.len() < self.config.pop_size {
            let p1 = self.tournament_select(population).genes.clone();
            let p2 = self.tournament_select(population).genes.clone();

            let (mut c1, mut c2) = self.crossover(&p1, &p2);
            self.mutate(&mut c1);
            self.mutate(&mut c2);

            next.push(self.make_individual(c1));
            if next.len() < self.config.pop_size {
                next.push(self.make_individual(c2));
            }
        }

        next
    }

    fn crossover(&mut self, p1: &[bool], p2: &[bool]) -> (Vec<bool>, Vec<bool>) {
        let mut c1 = p1.to_vec();
        let mut c2 = p2.to_vec();

        if p1.len() >= 2 && self.rng.gen::<f64>() < self.config.crossover_prob {
            let point = self.rng.gen_range(1..p1.len());
            for i in point..p1.len() {
                c1[i] = p2[i];
                c2[i] = p1[i];
            }
        }

        (c1, c2)
    }

    /// With probability `mutation_prob`, flip exactly one random bit, then
    /// re-enforce the at-least-one-gene invariant.
    fn mutate(&mut self, genes: &mut [bool]) {
        if self.rng.gen::<f64>() < self.config.mutation_prob {
            let i = self.rng.gen_range(0..genes.len());
            genes[i] = !genes[i];
        }
        if genes.iter().all(|g| !g) {
            let i = self.rng.gen_range(0..genes.len());
            genes[i] = true;
        }
    }

    fn top_solutions(&self, mut population: Vec<Individual>) -> Vec<GaSolution> {
        population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let mut seen: HashSet<Vec<bool>> = HashSet::new();
        let mut out = Vec::with_capacity(10);
        for ind in population {
            if !seen.insert(ind.genes.clone()) {
                continue;
            }
            let members: Vec<&Parcel> = ind
                .genes
                .iter()
                .zip(self.parcels.iter())
                .filter_map(|(on, p)| on.then_some(p))
                .collect();
            let combo = Combination::from_parcels(&members);
            out.push(GaSolution {
                parcel_ids: combo.parcel_ids,
                total_area: combo.total_area,
                estimated_far: combo.combined_far,
                estimated_cost: combo.total_cost,
                fitness: ind.fitness,
            });
            if out.len() == 10 {
                break;
            }
        }
        out
    }
}
